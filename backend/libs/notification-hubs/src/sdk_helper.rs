//! Registration validation entry point
//!
//! Validation runs as two explicit steps. [`infer_headers`] returns a copy
//! of the registration with the WNS/MPNS type headers derived from the body
//! template, and [`validate_registration`] validates that copy. The
//! caller's value is never mutated.

use tracing::debug;

use crate::api_version::ApiVersion;
use crate::error::Result;
use crate::registration::{PlatformRegistration, RegistrationDescription};

/// Copy of `registration` with platform type headers filled in where absent
pub fn infer_headers(registration: &RegistrationDescription) -> Result<RegistrationDescription> {
    let mut prepared = registration.clone();
    match &registration.registration {
        PlatformRegistration::WindowsTemplate(template) => {
            prepared.registration = template.with_inferred_type()?.into();
        }
        PlatformRegistration::MpnsTemplate(template) => {
            prepared.registration = template.with_inferred_type()?.into();
        }
        _ => {}
    }
    Ok(prepared)
}

/// Infers headers, validates with server-only fields rejected, and returns
/// the prepared registration ready to be sent
///
/// Windows and MPNS XML templates come back with the located template
/// expressions recorded on them.
pub fn validate_registration(
    registration: &RegistrationDescription,
    version: ApiVersion,
) -> Result<RegistrationDescription> {
    let mut prepared = infer_headers(registration)?;
    prepared.validate(version, true)?;

    match &mut prepared.registration {
        PlatformRegistration::WindowsTemplate(template) => {
            template.expressions = template.scan(version)?;
        }
        PlatformRegistration::MpnsTemplate(template) => {
            template.expressions = template.scan(version)?;
        }
        _ => {}
    }

    debug!(
        platform = prepared.registration.platform(),
        registration_id = prepared.registration_id.as_deref().unwrap_or(""),
        api_version = %version,
        "Registration validated"
    );
    Ok(prepared)
}

/// [`validate_registration`] plus the check that the registration is not
/// bound to another hub
pub fn validate_registration_for_hub(
    registration: &RegistrationDescription,
    hub_path: &str,
    version: ApiVersion,
) -> Result<RegistrationDescription> {
    registration.validate_hub_path(hub_path)?;
    validate_registration(registration, version)
}
