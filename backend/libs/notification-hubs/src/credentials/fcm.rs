//! Firebase Cloud Messaging (legacy server key) credential

use serde::{Deserialize, Serialize};

use super::{require, PnsCredentialProperties, PnsCredentialValidator};
use crate::error::Result;

const GOOGLE_API_KEY: &str = "GoogleApiKey";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FcmCredential {
    pub google_api_key: Option<String>,
}

impl FcmCredential {
    pub fn new(google_api_key: impl Into<String>) -> Self {
        Self {
            google_api_key: Some(google_api_key.into()),
        }
    }

    /// Unknown keys are dropped; the service ignores them for FCM
    pub fn from_properties(mut props: PnsCredentialProperties) -> Self {
        Self {
            google_api_key: props.take(GOOGLE_API_KEY),
        }
    }

    pub fn to_properties(&self) -> PnsCredentialProperties {
        let mut props = PnsCredentialProperties::new();
        props.set_opt(GOOGLE_API_KEY, self.google_api_key.as_ref());
        props
    }
}

impl PnsCredentialValidator for FcmCredential {
    fn validate(&self, _allow_local_mock_pns: bool) -> Result<()> {
        require(&self.google_api_key, "FcmGoogleApiKeyNotSpecified", GOOGLE_API_KEY)
    }
}
