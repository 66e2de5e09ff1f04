//! Baidu Cloud Push credential

use serde::{Deserialize, Serialize};

use super::{require, PnsCredentialProperties, PnsCredentialValidator};
use crate::error::Result;

const BAIDU_API_KEY: &str = "BaiduApiKey";
const BAIDU_SECRET_KEY: &str = "BaiduSecretKey";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaiduCredential {
    pub baidu_api_key: Option<String>,
    pub baidu_secret_key: Option<String>,
}

impl BaiduCredential {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            baidu_api_key: Some(api_key.into()),
            baidu_secret_key: Some(secret_key.into()),
        }
    }

    pub fn from_properties(mut props: PnsCredentialProperties) -> Self {
        Self {
            baidu_api_key: props.take(BAIDU_API_KEY),
            baidu_secret_key: props.take(BAIDU_SECRET_KEY),
        }
    }

    pub fn to_properties(&self) -> PnsCredentialProperties {
        let mut props = PnsCredentialProperties::new();
        props.set_opt(BAIDU_API_KEY, self.baidu_api_key.as_ref());
        props.set_opt(BAIDU_SECRET_KEY, self.baidu_secret_key.as_ref());
        props
    }
}

impl PnsCredentialValidator for BaiduCredential {
    fn validate(&self, _allow_local_mock_pns: bool) -> Result<()> {
        require(&self.baidu_api_key, "BaiduApiKeyNotSpecified", BAIDU_API_KEY)?;
        require(&self.baidu_secret_key, "BaiduSecretKeyNotSpecified", BAIDU_SECRET_KEY)
    }
}
