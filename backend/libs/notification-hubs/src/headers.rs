//! Platform delivery headers attached to template registrations

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// WNS notification type header (`toast`, `tile`, `badge`, `raw`)
pub const WNS_TYPE: &str = "X-WNS-Type";

/// MPNS notification type header (`toast`, `token`)
pub const MPNS_TYPE: &str = "X-WindowsPhone-Target";

/// MPNS notification class header (batching interval and kind)
pub const MPNS_NOTIFICATION_CLASS: &str = "X-NotificationClass";

/// Every APNs header key must start with this prefix
pub const APNS_HEADER_PREFIX: &str = "apns-";

pub const APNS_PRIORITY: &str = "apns-priority";

pub const APNS_EXPIRATION: &str = "apns-expiration";

/// Ordered header map; keys compare case-insensitively and are unique
///
/// The wire shape is a list of `[key, value]` pairs. Deserializing a list
/// that repeats a key fails the same way `insert` does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct HeaderCollection {
    entries: Vec<(String, String)>,
}

pub type WnsHeaderCollection = HeaderCollection;
pub type MpnsHeaderCollection = HeaderCollection;
pub type ApnsHeaderCollection = HeaderCollection;

impl HeaderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, failing if the key is already present
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(ValidationError::InvalidDataContract {
                reason: "DuplicateHeaderKey",
                message: format!("header '{}' is already present", key),
            });
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Adds a header only when absent; returns whether it was written
    pub fn insert_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.entries.push((key.to_string(), value.to_string()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderCollection {
    /// Later duplicates of a key are dropped
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderCollection::new();
        for (key, value) in iter {
            let key = key.into();
            let value = value.into();
            headers.insert_if_absent(&key, &value);
        }
        headers
    }
}

impl TryFrom<Vec<(String, String)>> for HeaderCollection {
    type Error = ValidationError;

    fn try_from(entries: Vec<(String, String)>) -> Result<Self> {
        let mut headers = HeaderCollection::new();
        for (key, value) in entries {
            headers.insert(key, value)?;
        }
        Ok(headers)
    }
}

impl From<HeaderCollection> for Vec<(String, String)> {
    fn from(headers: HeaderCollection) -> Self {
        headers.entries
    }
}
