//! Apple Push Notification service (APNs) registrations

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::template;
use super::RegistrationValidator;
use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};
use crate::expression;
use crate::headers::{ApnsHeaderCollection, APNS_EXPIRATION, APNS_HEADER_PREFIX, APNS_PRIORITY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppleRegistration {
    pub device_token: String,
}

impl AppleRegistration {
    pub fn new(device_token: impl Into<String>) -> Self {
        Self {
            device_token: device_token.into(),
        }
    }
}

impl RegistrationValidator for AppleRegistration {
    fn validate(&self, _version: ApiVersion) -> Result<()> {
        validate_device_token(&self.device_token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppleTemplateRegistration {
    pub device_token: String,
    pub body_template: String,
    /// Date-time, `"0"`, or a template expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// 0-255, or a template expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub apns_headers: ApnsHeaderCollection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl AppleTemplateRegistration {
    pub fn new(device_token: impl Into<String>, body_template: impl Into<String>) -> Self {
        Self {
            device_token: device_token.into(),
            body_template: body_template.into(),
            expiry: None,
            priority: None,
            apns_headers: ApnsHeaderCollection::new(),
            template_name: None,
        }
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    fn validate_expiry(&self, version: ApiVersion) -> Result<()> {
        let Some(expiry) = self.expiry.as_deref().filter(|e| !e.trim().is_empty()) else {
            return Ok(());
        };
        if expression::validate(expiry, version)?.is_literal()
            && expiry.trim() != "0"
            && !is_date_time(expiry.trim())
        {
            return Err(invalid_field("InvalidApnsExpiry", "Expiry", expiry));
        }
        Ok(())
    }

    fn validate_priority(&self, version: ApiVersion) -> Result<()> {
        let Some(priority) = self.priority.as_deref().filter(|p| !p.trim().is_empty()) else {
            return Ok(());
        };
        if expression::validate(priority, version)?.is_literal()
            && priority.trim().parse::<u8>().is_err()
        {
            return Err(invalid_field("InvalidApnsPriority", "Priority", priority));
        }
        Ok(())
    }

    fn validate_headers(&self, version: ApiVersion) -> Result<()> {
        for (key, value) in self.apns_headers.iter() {
            let has_prefix = key
                .get(..APNS_HEADER_PREFIX.len())
                .map_or(false, |prefix| prefix.eq_ignore_ascii_case(APNS_HEADER_PREFIX));
            if !has_prefix {
                return Err(ValidationError::InvalidDataContract {
                    reason: "InvalidApnsHeaderKey",
                    message: format!(
                        "header '{}' must start with '{}'",
                        key, APNS_HEADER_PREFIX
                    ),
                });
            }

            let literal = template::validate_header_value(key, value, version)?.is_literal();
            if !literal {
                continue;
            }
            if key.eq_ignore_ascii_case(APNS_PRIORITY) && value.trim().parse::<u8>().is_err() {
                return Err(invalid_field("InvalidApnsPriority", key, value));
            }
            if key.eq_ignore_ascii_case(APNS_EXPIRATION) && value.trim().parse::<i64>().is_err() {
                return Err(invalid_field("InvalidApnsExpiry", key, value));
            }
        }
        Ok(())
    }
}

impl RegistrationValidator for AppleTemplateRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        validate_device_token(&self.device_token)?;
        self.validate_expiry(version)?;
        self.validate_priority(version)?;
        self.validate_headers(version)?;
        template::validate_json_template(
            &self.body_template,
            self.template_name.as_deref(),
            version,
        )
    }
}

fn invalid_field(reason: &'static str, field: &str, value: &str) -> ValidationError {
    ValidationError::InvalidDataContract {
        reason,
        message: format!("'{}' is not a valid value for {}", value, field),
    }
}

/// Local date-times, seconds optional; a trailing `Z` is tolerated
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn is_date_time(value: &str) -> bool {
    let naive = value.strip_suffix('Z').unwrap_or(value);
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z").is_ok()
        || NAIVE_DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(naive, format).is_ok())
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn validate_device_token(token: &str) -> Result<()> {
    if token.trim().is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::invalid_handle(
            "InvalidDeviceToken",
            "APNs device token must be a non-empty hexadecimal string",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "ABCDEF0123456789abcdef0123456789ABCDEF0123456789abcdef0123456789";
    const BODY: &str = r##"{"aps":{"alert":"$(message)","badge":"#(count)"}}"##;

    fn template() -> AppleTemplateRegistration {
        AppleTemplateRegistration::new(TOKEN, BODY)
    }

    #[test]
    fn test_valid_template() {
        let mut reg = template();
        reg.expiry = Some("2030-01-01T00:00:00Z".into());
        reg.priority = Some("10".into());
        reg.apns_headers.insert(APNS_PRIORITY, "5").unwrap();
        reg.apns_headers.insert(APNS_EXPIRATION, "1700000000").unwrap();
        reg.apns_headers.insert("apns-push-type", "alert").unwrap();
        assert!(reg.validate(ApiVersion::LATEST).is_ok());
    }

    #[test]
    fn test_expiry_literal_zero_and_expression() {
        let mut reg = template();
        reg.expiry = Some("0".into());
        assert!(reg.validate(ApiVersion::LATEST).is_ok());
        reg.expiry = Some("$(expiry)".into());
        assert!(reg.validate(ApiVersion::LATEST).is_ok());
        reg.expiry = Some("tomorrow".into());
        assert_eq!(
            reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
            "InvalidApnsExpiry"
        );
    }

    #[test]
    fn test_expiry_accepts_minute_precision() {
        let mut reg = template();
        for expiry in [
            "2030-01-01T10:30",
            "2030-01-01 10:30",
            "2030-01-01T10:30Z",
            "2030-01-01T10:30+02:00",
            "2030-01-01T10:30:15.250",
            "2030-01-01",
        ] {
            reg.expiry = Some(expiry.into());
            assert!(reg.validate(ApiVersion::LATEST).is_ok(), "expiry {:?}", expiry);
        }

        for expiry in ["2030-01-01T10", "2030-13-01T10:30", "10:30"] {
            reg.expiry = Some(expiry.into());
            assert_eq!(
                reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
                "InvalidApnsExpiry",
                "expiry {:?}",
                expiry
            );
        }
    }

    #[test]
    fn test_priority_must_be_a_byte_when_literal() {
        let mut reg = template();
        reg.priority = Some("256".into());
        assert_eq!(
            reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
            "InvalidApnsPriority"
        );
        reg.priority = Some("#(priority)".into());
        assert!(reg.validate(ApiVersion::LATEST).is_ok());
    }

    #[test]
    fn test_header_key_prefix() {
        let mut reg = template();
        reg.apns_headers.insert("X-Custom", "1").unwrap();
        let err = reg.validate(ApiVersion::LATEST).unwrap_err();
        assert_eq!(err.reason(), "InvalidApnsHeaderKey");
        assert!(err.to_string().contains("X-Custom"));
    }

    #[test]
    fn test_header_literals() {
        let mut reg = template();
        reg.apns_headers.insert(APNS_EXPIRATION, "soon").unwrap();
        assert_eq!(
            reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
            "InvalidApnsExpiry"
        );

        let mut reg = template();
        reg.apns_headers.insert(APNS_PRIORITY, "$(p)").unwrap();
        assert!(reg.validate(ApiVersion::LATEST).is_ok());
    }

    #[test]
    fn test_body_must_be_json() {
        let reg = AppleTemplateRegistration::new(TOKEN, r#"{"aps":"#);
        assert_eq!(
            reg.validate(ApiVersion::LATEST).unwrap_err().reason(),
            "BodyTemplateDeserializeFailed"
        );
    }

    #[test]
    fn test_device_token_must_be_hex() {
        assert!(AppleRegistration::new(TOKEN).validate(ApiVersion::LATEST).is_ok());
        assert_eq!(
            AppleRegistration::new("not-hex")
                .validate(ApiVersion::LATEST)
                .unwrap_err()
                .reason(),
            "InvalidDeviceToken"
        );
    }
}
