//! Windows Notification Service credential

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::{is_allowed_url, non_blank, require, PnsCredentialProperties, PnsCredentialValidator};
use crate::error::{Result, ValidationError};

pub const WNS_LIVE_ENDPOINT: &str = "https://login.live.com/accesstoken.srf";
pub const WNS_MOCK_LIVE_ENDPOINT: &str = "http://localhost:8450/wns/accesstoken";

const PACKAGE_SID: &str = "PackageSid";
const SECRET_KEY: &str = "SecretKey";
const WINDOWS_LIVE_ENDPOINT: &str = "WindowsLiveEndpoint";

/// Equality covers `package_sid` and `secret_key` only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WnsCredential {
    pub package_sid: Option<String>,
    pub secret_key: Option<String>,
    /// Defaults to [`WNS_LIVE_ENDPOINT`] when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_live_endpoint: Option<String>,
}

impl WnsCredential {
    pub fn new(package_sid: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            package_sid: Some(package_sid.into()),
            secret_key: Some(secret_key.into()),
            windows_live_endpoint: None,
        }
    }

    pub fn from_properties(mut props: PnsCredentialProperties) -> Self {
        Self {
            package_sid: props.take(PACKAGE_SID),
            secret_key: props.take(SECRET_KEY),
            windows_live_endpoint: props.take(WINDOWS_LIVE_ENDPOINT),
        }
    }

    pub fn to_properties(&self) -> PnsCredentialProperties {
        let mut props = PnsCredentialProperties::new();
        props.set_opt(PACKAGE_SID, self.package_sid.as_ref());
        props.set_opt(SECRET_KEY, self.secret_key.as_ref());
        props.set_opt(WINDOWS_LIVE_ENDPOINT, self.windows_live_endpoint.as_ref());
        props
    }

    pub fn windows_live_endpoint(&self) -> &str {
        non_blank(&self.windows_live_endpoint).unwrap_or(WNS_LIVE_ENDPOINT)
    }
}

impl PnsCredentialValidator for WnsCredential {
    fn validate(&self, allow_local_mock_pns: bool) -> Result<()> {
        require(&self.package_sid, "WnsPackageSidNotSpecified", PACKAGE_SID)?;
        require(&self.secret_key, "WnsSecretKeyNotSpecified", SECRET_KEY)?;

        if let Some(endpoint) = non_blank(&self.windows_live_endpoint) {
            let mut allowed = vec![WNS_LIVE_ENDPOINT];
            if allow_local_mock_pns {
                allowed.push(WNS_MOCK_LIVE_ENDPOINT);
            }
            if !is_allowed_url(endpoint, &allowed) {
                return Err(ValidationError::invalid_url(
                    "InvalidWindowsLiveEndpoint",
                    WINDOWS_LIVE_ENDPOINT,
                    endpoint,
                ));
            }
        }
        Ok(())
    }
}

impl PartialEq for WnsCredential {
    fn eq(&self, other: &Self) -> bool {
        self.package_sid == other.package_sid && self.secret_key == other.secret_key
    }
}

impl Eq for WnsCredential {}

impl Hash for WnsCredential {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package_sid.hash(state);
        self.secret_key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        assert!(WnsCredential::new("ms-app://s-1-15", "secret").validate(false).is_ok());
        assert_eq!(
            WnsCredential::default().validate(false).unwrap_err().reason(),
            "WnsPackageSidNotSpecified"
        );
        assert_eq!(
            WnsCredential::new("sid", "").validate(false).unwrap_err().reason(),
            "WnsSecretKeyNotSpecified"
        );
    }

    #[test]
    fn test_live_endpoint_allow_list() {
        let mut cred = WnsCredential::new("sid", "secret");
        cred.windows_live_endpoint = Some(WNS_MOCK_LIVE_ENDPOINT.to_string());
        assert!(cred.validate(true).is_ok());
        assert_eq!(cred.validate(false).unwrap_err().reason(), "InvalidWindowsLiveEndpoint");

        cred.windows_live_endpoint = Some("not a url".to_string());
        assert!(cred.validate(true).is_err());
    }

    #[test]
    fn test_default_endpoint() {
        let cred = WnsCredential::new("sid", "secret");
        assert_eq!(cred.windows_live_endpoint(), WNS_LIVE_ENDPOINT);
    }
}
