//! Apple Push Notification service credential
//!
//! Two authentication modes exist and exactly one must be configured:
//! a client certificate (`ApnsCertificate`, optionally protected by
//! `CertificateKey`) or a token signing key (`Token` plus `KeyId`,
//! `AppId` and `AppName`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tracing::debug;

use super::certificate::decode_certificate;
use super::{non_blank, require, PnsCredentialProperties, PnsCredentialValidator};
use crate::error::{Result, ValidationError};

pub const APNS_PRODUCTION_ENDPOINT: &str = "https://api.push.apple.com:443/3/device";
pub const APNS_SANDBOX_ENDPOINT: &str = "https://api.development.push.apple.com:443/3/device";

const ENDPOINT: &str = "Endpoint";
const APNS_CERTIFICATE: &str = "ApnsCertificate";
const CERTIFICATE_KEY: &str = "CertificateKey";
const TOKEN: &str = "Token";
const KEY_ID: &str = "KeyId";
const APP_ID: &str = "AppId";
const APP_NAME: &str = "AppName";

/// Equality covers every typed field; unknown wire properties are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApnsCredential {
    pub endpoint: Option<String>,
    /// Base64 encoded certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apns_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "PnsCredentialProperties::is_empty")]
    pub additional_properties: PnsCredentialProperties,
}

impl ApnsCredential {
    /// Certificate authentication against the production endpoint
    pub fn with_certificate(
        apns_certificate: impl Into<String>,
        certificate_key: Option<String>,
    ) -> Self {
        Self {
            endpoint: Some(APNS_PRODUCTION_ENDPOINT.to_string()),
            apns_certificate: Some(apns_certificate.into()),
            certificate_key,
            ..Default::default()
        }
    }

    /// Token authentication against the production endpoint
    pub fn with_token(
        token: impl Into<String>,
        key_id: impl Into<String>,
        app_id: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Some(APNS_PRODUCTION_ENDPOINT.to_string()),
            token: Some(token.into()),
            key_id: Some(key_id.into()),
            app_id: Some(app_id.into()),
            app_name: Some(app_name.into()),
            ..Default::default()
        }
    }

    pub fn from_properties(mut props: PnsCredentialProperties) -> Self {
        Self {
            endpoint: props.take(ENDPOINT),
            apns_certificate: props.take(APNS_CERTIFICATE),
            certificate_key: props.take(CERTIFICATE_KEY),
            token: props.take(TOKEN),
            key_id: props.take(KEY_ID),
            app_id: props.take(APP_ID),
            app_name: props.take(APP_NAME),
            additional_properties: props,
        }
    }

    pub fn to_properties(&self) -> PnsCredentialProperties {
        let mut props = self.additional_properties.clone();
        props.set_opt(ENDPOINT, self.endpoint.as_ref());
        props.set_opt(APNS_CERTIFICATE, self.apns_certificate.as_ref());
        props.set_opt(CERTIFICATE_KEY, self.certificate_key.as_ref());
        props.set_opt(TOKEN, self.token.as_ref());
        props.set_opt(KEY_ID, self.key_id.as_ref());
        props.set_opt(APP_ID, self.app_id.as_ref());
        props.set_opt(APP_NAME, self.app_name.as_ref());
        props
    }

    pub fn is_token_based(&self) -> bool {
        non_blank(&self.token).is_some()
    }

    /// Same checks as [`PnsCredentialValidator::validate`] with an explicit
    /// clock for the certificate validity window
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<()> {
        require(&self.endpoint, "ApnsEndpointNotSpecified", ENDPOINT)?;

        match (non_blank(&self.token), non_blank(&self.apns_certificate)) {
            (Some(_), Some(_)) => Err(ValidationError::MutuallyExclusiveFields {
                reason: "ApnsProvideOnlyOneCredentialType",
                message: "provide either Token or ApnsCertificate, not both".to_string(),
            }),
            (None, None) => Err(ValidationError::MutuallyExclusiveFields {
                reason: "ApnsPropertiesNotSpecified",
                message: "either Token or ApnsCertificate must be specified".to_string(),
            }),
            (Some(token), None) => {
                require(&self.key_id, "ApnsKeyIdNotSpecified", KEY_ID)?;
                require(&self.app_id, "ApnsAppIdNotSpecified", APP_ID)?;
                require(&self.app_name, "ApnsAppNameNotSpecified", APP_NAME)?;
                debug!(token_len = token.len(), "APNs token credential accepted");
                Ok(())
            }
            (None, Some(certificate)) => {
                let info = decode_certificate(certificate, non_blank(&self.certificate_key))?;
                info.check_usable_at(now)
            }
        }
    }
}

impl PnsCredentialValidator for ApnsCredential {
    fn validate(&self, _allow_local_mock_pns: bool) -> Result<()> {
        self.validate_at(Utc::now())
    }
}

impl PartialEq for ApnsCredential {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint
            && self.apns_certificate == other.apns_certificate
            && self.certificate_key == other.certificate_key
            && self.token == other.token
            && self.key_id == other.key_id
            && self.app_id == other.app_id
            && self.app_name == other.app_name
    }
}

impl Eq for ApnsCredential {}

impl Hash for ApnsCredential {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.endpoint.hash(state);
        self.apns_certificate.hash(state);
        self.certificate_key.hash(state);
        self.token.hash(state);
        self.key_id.hash(state);
        self.app_id.hash(state);
        self.app_name.hash(state);
    }
}
