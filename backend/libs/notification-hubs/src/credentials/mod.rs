//! Hub-level push network credentials
//!
//! Each credential is a typed struct. The management API exchanges them as
//! a flat, case-insensitive property bag ([`PnsCredentialProperties`]);
//! conversion happens only at that boundary, and unknown keys are kept so
//! validation can reject them.

pub mod adm;
pub mod apns;
pub mod baidu;
pub mod certificate;
pub mod fcm;
pub mod wns;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

use crate::error::{Result, ValidationError};

pub use adm::AdmCredential;
pub use apns::ApnsCredential;
pub use baidu::BaiduCredential;
pub use fcm::FcmCredential;
pub use wns::WnsCredential;

/// Validation a credential must pass before it is attached to a hub
pub trait PnsCredentialValidator {
    /// `allow_local_mock_pns` additionally admits the localhost mock endpoints
    fn validate(&self, allow_local_mock_pns: bool) -> Result<()>;
}

/// Case-insensitive string property bag, the wire shape of a credential
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct PnsCredentialProperties {
    entries: BTreeMap<String, (String, String)>,
}

impl PnsCredentialProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces; the latest key spelling wins
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.entries
            .insert(key.to_lowercase(), (key, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries
            .remove(&key.to_lowercase())
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Removes `key` and returns its value when non-empty
    pub(crate) fn take(&mut self, key: &str) -> Option<String> {
        self.remove(key).filter(|value| !value.is_empty())
    }

    pub(crate) fn set_opt(&mut self, key: &str, value: Option<&String>) {
        if let Some(value) = value {
            self.insert(key, value.clone());
        }
    }
}

impl From<BTreeMap<String, String>> for PnsCredentialProperties {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut props = PnsCredentialProperties::new();
        for (key, value) in map {
            props.insert(key, value);
        }
        props
    }
}

impl From<PnsCredentialProperties> for BTreeMap<String, String> {
    fn from(props: PnsCredentialProperties) -> Self {
        props.entries.into_values().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PnsCredentialProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = PnsCredentialProperties::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}

/// Credential attached to a notification hub, one per push network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "properties")]
pub enum PnsCredential {
    #[serde(rename = "AdmCredential")]
    Adm(AdmCredential),
    #[serde(rename = "ApnsCredential")]
    Apns(ApnsCredential),
    #[serde(rename = "BaiduCredential")]
    Baidu(BaiduCredential),
    #[serde(rename = "FcmCredential")]
    Fcm(FcmCredential),
    #[serde(rename = "WnsCredential")]
    Wns(WnsCredential),
}

impl PnsCredential {
    /// Wire name of the credential element
    pub fn name(&self) -> &'static str {
        match self {
            PnsCredential::Adm(_) => "AdmCredential",
            PnsCredential::Apns(_) => "ApnsCredential",
            PnsCredential::Baidu(_) => "BaiduCredential",
            PnsCredential::Fcm(_) => "FcmCredential",
            PnsCredential::Wns(_) => "WnsCredential",
        }
    }

    pub fn to_properties(&self) -> PnsCredentialProperties {
        match self {
            PnsCredential::Adm(c) => c.to_properties(),
            PnsCredential::Apns(c) => c.to_properties(),
            PnsCredential::Baidu(c) => c.to_properties(),
            PnsCredential::Fcm(c) => c.to_properties(),
            PnsCredential::Wns(c) => c.to_properties(),
        }
    }

    /// Rebuilds a credential from its wire name and property bag
    pub fn from_properties(name: &str, props: PnsCredentialProperties) -> Option<Self> {
        let credential = match name {
            "AdmCredential" => PnsCredential::Adm(AdmCredential::from_properties(props)),
            "ApnsCredential" => PnsCredential::Apns(ApnsCredential::from_properties(props)),
            "BaiduCredential" => PnsCredential::Baidu(BaiduCredential::from_properties(props)),
            "FcmCredential" | "GcmCredential" => {
                PnsCredential::Fcm(FcmCredential::from_properties(props))
            }
            "WnsCredential" => PnsCredential::Wns(WnsCredential::from_properties(props)),
            _ => return None,
        };
        Some(credential)
    }
}

impl PnsCredentialValidator for PnsCredential {
    fn validate(&self, allow_local_mock_pns: bool) -> Result<()> {
        let result = match self {
            PnsCredential::Adm(c) => c.validate(allow_local_mock_pns),
            PnsCredential::Apns(c) => c.validate(allow_local_mock_pns),
            PnsCredential::Baidu(c) => c.validate(allow_local_mock_pns),
            PnsCredential::Fcm(c) => c.validate(allow_local_mock_pns),
            PnsCredential::Wns(c) => c.validate(allow_local_mock_pns),
        };
        if let Err(e) = &result {
            debug!(credential = self.name(), reason = e.reason(), "Credential failed validation");
        }
        result
    }
}

/// Trimmed value when present and not blank
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub(crate) fn require(
    value: &Option<String>,
    reason: &'static str,
    field: &str,
) -> Result<()> {
    match non_blank(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::missing(reason, field)),
    }
}

/// Absolute URI equal (ignoring case) to one of `allowed`
pub(crate) fn is_allowed_url(value: &str, allowed: &[&str]) -> bool {
    Url::parse(value).is_ok() && allowed.iter().any(|url| url.eq_ignore_ascii_case(value))
}

/// Rejects the first property outside `allowed`
pub(crate) fn reject_extra_properties(
    extra: &PnsCredentialProperties,
    reason: &'static str,
    allowed: &[&str],
) -> Result<()> {
    match extra.iter().next() {
        Some((key, _)) => Err(ValidationError::DisallowedExtraField {
            reason,
            property: key.to_string(),
            allowed: allowed.join(", "),
        }),
        None => Ok(()),
    }
}
