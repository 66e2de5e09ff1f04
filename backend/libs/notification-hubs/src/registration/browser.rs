//! Web push (browser) registrations

use serde::{Deserialize, Serialize};
use url::Url;

use super::template;
use super::RegistrationValidator;
use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};

/// Push subscription as handed out by the browser's PushManager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserPushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

impl BrowserPushSubscription {
    fn validate(&self) -> Result<()> {
        match Url::parse(&self.endpoint) {
            Ok(url) if url.scheme() == "https" => {}
            _ => {
                return Err(ValidationError::invalid_handle(
                    "InvalidBrowserEndpoint",
                    "browser push endpoint must be an absolute https URI",
                ))
            }
        }
        if self.p256dh.trim().is_empty() {
            return Err(ValidationError::missing("BrowserP256dhNotSpecified", "P256DH"));
        }
        if self.auth.trim().is_empty() {
            return Err(ValidationError::missing("BrowserAuthNotSpecified", "Auth"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserRegistration {
    pub subscription: BrowserPushSubscription,
}

impl RegistrationValidator for BrowserRegistration {
    fn validate(&self, _version: ApiVersion) -> Result<()> {
        self.subscription.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserTemplateRegistration {
    pub subscription: BrowserPushSubscription,
    pub body_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl RegistrationValidator for BrowserTemplateRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        self.subscription.validate()?;
        template::validate_json_template(
            &self.body_template,
            self.template_name.as_deref(),
            version,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription() -> BrowserPushSubscription {
        BrowserPushSubscription {
            endpoint: "https://fcm.googleapis.com/fcm/send/abc".into(),
            p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA".into(),
            auth: "tBHItJI5svbpez7KI4CCXg".into(),
        }
    }

    #[test]
    fn test_browser_registration() {
        let reg = BrowserRegistration {
            subscription: subscription(),
        };
        assert!(reg.validate(ApiVersion::LATEST).is_ok());

        let mut bad = subscription();
        bad.auth = String::new();
        let err = BrowserRegistration { subscription: bad }
            .validate(ApiVersion::LATEST)
            .unwrap_err();
        assert_eq!(err.reason(), "BrowserAuthNotSpecified");
    }

    #[test]
    fn test_browser_template_body() {
        let reg = BrowserTemplateRegistration {
            subscription: subscription(),
            body_template: r#"{"title":"$(title)"}"#.into(),
            template_name: Some("default".into()),
        };
        assert!(reg.validate(ApiVersion::LATEST).is_ok());
    }

    #[test]
    fn test_endpoint_must_be_https() {
        let mut sub = subscription();
        sub.endpoint = "http://example.com/push".into();
        let err = BrowserRegistration { subscription: sub }
            .validate(ApiVersion::LATEST)
            .unwrap_err();
        assert_eq!(err.reason(), "InvalidBrowserEndpoint");
    }
}
