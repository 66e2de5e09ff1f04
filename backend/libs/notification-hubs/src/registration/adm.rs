//! Amazon Device Messaging (ADM) registrations

use serde::{Deserialize, Serialize};

use super::template;
use super::RegistrationValidator;
use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmRegistration {
    pub adm_registration_id: String,
}

impl AdmRegistration {
    pub fn new(adm_registration_id: impl Into<String>) -> Self {
        Self {
            adm_registration_id: adm_registration_id.into(),
        }
    }
}

impl RegistrationValidator for AdmRegistration {
    fn validate(&self, _version: ApiVersion) -> Result<()> {
        validate_registration_id(&self.adm_registration_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmTemplateRegistration {
    pub adm_registration_id: String,
    pub body_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl AdmTemplateRegistration {
    pub fn new(adm_registration_id: impl Into<String>, body_template: impl Into<String>) -> Self {
        Self {
            adm_registration_id: adm_registration_id.into(),
            body_template: body_template.into(),
            template_name: None,
        }
    }
}

impl RegistrationValidator for AdmTemplateRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        validate_registration_id(&self.adm_registration_id)?;
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
            "AdmRegistrationIdNotSpecified",
            "ADM registration id must be specified",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adm_template() {
        let reg = AdmTemplateRegistration::new(
            "amzn1.adm-registration.v3.Y29tLmFtYXpvbi",
            r#"{"data":{"msg":"$(message)"}}"#,
        );
        assert!(reg.validate(ApiVersion::LATEST).is_ok());

        let reg = AdmTemplateRegistration::new("", r#"{"data":{}}"#);
        assert_eq!(
            reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
            "AdmRegistrationIdNotSpecified"
        );
    }
}
