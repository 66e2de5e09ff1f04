//! Firebase Cloud Messaging (FCM) registrations

use serde::{Deserialize, Serialize};

use super::template;
use super::RegistrationValidator;
use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmRegistration {
    pub fcm_registration_id: String,
}

impl FcmRegistration {
    pub fn new(fcm_registration_id: impl Into<String>) -> Self {
        Self {
            fcm_registration_id: fcm_registration_id.into(),
        }
    }
}

impl RegistrationValidator for FcmRegistration {
    fn validate(&self, _version: ApiVersion) -> Result<()> {
        validate_registration_id(&self.fcm_registration_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmTemplateRegistration {
    pub fcm_registration_id: String,
    pub body_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl FcmTemplateRegistration {
    pub fn new(fcm_registration_id: impl Into<String>, body_template: impl Into<String>) -> Self {
        Self {
            fcm_registration_id: fcm_registration_id.into(),
            body_template: body_template.into(),
            template_name: None,
        }
    }
}

impl RegistrationValidator for FcmTemplateRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        validate_registration_id(&self.fcm_registration_id)?;
        template::validate_json_template(
            &self.body_template,
            self.template_name.as_deref(),
            version,
        )
    }
}

fn validate_registration_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::invalid_handle(
            "FcmRegistrationIdNotSpecified",
            "FCM registration id must be specified",
        ));
    }
    Ok(())
}
