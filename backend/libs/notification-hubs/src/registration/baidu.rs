//! Baidu Cloud Push registrations

use serde::{Deserialize, Serialize};

use super::template;
use super::RegistrationValidator;
use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaiduRegistration {
    pub baidu_user_id: String,
    pub baidu_channel_id: String,
}

impl BaiduRegistration {
    pub fn new(user_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            baidu_user_id: user_id.into(),
            baidu_channel_id: channel_id.into(),
        }
    }
}

impl RegistrationValidator for BaiduRegistration {
    fn validate(&self, _version: ApiVersion) -> Result<()> {
        validate_ids(&self.baidu_user_id, &self.baidu_channel_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaiduTemplateRegistration {
    pub baidu_user_id: String,
    pub baidu_channel_id: String,
    pub body_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl BaiduTemplateRegistration {
    pub fn new(
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
        body_template: impl Into<String>,
    ) -> Self {
        Self {
            baidu_user_id: user_id.into(),
            baidu_channel_id: channel_id.into(),
            body_template: body_template.into(),
            template_name: None,
        }
    }
}

impl RegistrationValidator for BaiduTemplateRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        validate_ids(&self.baidu_user_id, &self.baidu_channel_id)?;
        template::validate_json_template(
            &self.body_template,
            self.template_name.as_deref(),
            version,
        )
    }
}

fn validate_ids(user_id: &str, channel_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::missing("BaiduUserIdNotSpecified", "BaiduUserId"));
    }
    if channel_id.trim().is_empty() {
        return Err(ValidationError::missing(
            "BaiduChannelIdNotSpecified",
            "BaiduChannelId",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_validation() {
        let mut reg = BaiduTemplateRegistration::new(
            "user",
            "channel",
            r#"{"title":"$(title)","description":"{'Hi ' + $(name)}"}"#,
        );
        assert!(reg.validate(ApiVersion::LATEST).is_ok());

        reg.template_name = Some("x".repeat(201));
        assert_eq!(
            reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
            "TemplateNameLengthExceeded"
        );
    }

    #[test]
    fn test_ids_required() {
        let err = BaiduRegistration::new("", "channel")
            .validate(ApiVersion::LATEST)
            .unwrap_err();
        assert_eq!(err.reason(), "BaiduUserIdNotSpecified");
        let err = BaiduRegistration::new("user", " ")
            .validate(ApiVersion::LATEST)
            .unwrap_err();
        assert_eq!(err.reason(), "BaiduChannelIdNotSpecified");
    }

    #[test]
    fn test_invalid_json_body() {
        let reg = BaiduTemplateRegistration::new("user", "channel", "<xml/>");
        assert_eq!(
            reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
            "BodyTemplateDeserializeFailed"
        );
    }
}
