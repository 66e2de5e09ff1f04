//! Device registrations
//!
//! A [`RegistrationDescription`] carries the identity and lifecycle fields
//! shared by every registration plus one [`PlatformRegistration`] variant
//! holding the platform handle and, for templates, the body and headers.

pub mod adm;
pub mod apple;
pub mod baidu;
pub mod browser;
pub mod fcm;
pub mod mpns;
pub mod template;
pub mod windows;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};
use crate::tags::{self, TagSet, MAX_TAG_LENGTH};

pub use adm::{AdmRegistration, AdmTemplateRegistration};
pub use apple::{AppleRegistration, AppleTemplateRegistration};
pub use baidu::{BaiduRegistration, BaiduTemplateRegistration};
pub use browser::{BrowserPushSubscription, BrowserRegistration, BrowserTemplateRegistration};
pub use fcm::{FcmRegistration, FcmTemplateRegistration};
pub use mpns::{MpnsRegistration, MpnsTemplateBodyType, MpnsTemplateRegistration};
pub use template::MAX_TEMPLATE_NAME_LENGTH;
pub use windows::{WindowsRegistration, WindowsTemplateBodyType, WindowsTemplateRegistration};

/// ETag matching any version, for unconditional deletes
pub const ETAG_ANY: &str = "*";

/// Per-platform validation
pub trait RegistrationValidator {
    fn validate(&self, version: ApiVersion) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform")]
pub enum PlatformRegistration {
    Windows(WindowsRegistration),
    WindowsTemplate(WindowsTemplateRegistration),
    Mpns(MpnsRegistration),
    MpnsTemplate(MpnsTemplateRegistration),
    Apple(AppleRegistration),
    AppleTemplate(AppleTemplateRegistration),
    Adm(AdmRegistration),
    AdmTemplate(AdmTemplateRegistration),
    Baidu(BaiduRegistration),
    BaiduTemplate(BaiduTemplateRegistration),
    Fcm(FcmRegistration),
    FcmTemplate(FcmTemplateRegistration),
    Browser(BrowserRegistration),
    BrowserTemplate(BrowserTemplateRegistration),
}

impl PlatformRegistration {
    pub fn platform(&self) -> &'static str {
        match self {
            PlatformRegistration::Windows(_) | PlatformRegistration::WindowsTemplate(_) => "windows",
            PlatformRegistration::Mpns(_) | PlatformRegistration::MpnsTemplate(_) => "mpns",
            PlatformRegistration::Apple(_) | PlatformRegistration::AppleTemplate(_) => "apple",
            PlatformRegistration::Adm(_) | PlatformRegistration::AdmTemplate(_) => "adm",
            PlatformRegistration::Baidu(_) | PlatformRegistration::BaiduTemplate(_) => "baidu",
            PlatformRegistration::Fcm(_) | PlatformRegistration::FcmTemplate(_) => "fcm",
            PlatformRegistration::Browser(_) | PlatformRegistration::BrowserTemplate(_) => "browser",
        }
    }

    pub fn is_template(&self) -> bool {
        self.body_template().is_some()
    }

    pub fn body_template(&self) -> Option<&str> {
        match self {
            PlatformRegistration::WindowsTemplate(t) => Some(&t.body_template),
            PlatformRegistration::MpnsTemplate(t) => Some(&t.body_template),
            PlatformRegistration::AppleTemplate(t) => Some(&t.body_template),
            PlatformRegistration::AdmTemplate(t) => Some(&t.body_template),
            PlatformRegistration::BaiduTemplate(t) => Some(&t.body_template),
            PlatformRegistration::FcmTemplate(t) => Some(&t.body_template),
            PlatformRegistration::BrowserTemplate(t) => Some(&t.body_template),
            _ => None,
        }
    }

    pub fn template_name(&self) -> Option<&str> {
        match self {
            PlatformRegistration::WindowsTemplate(t) => t.template_name.as_deref(),
            PlatformRegistration::MpnsTemplate(t) => t.template_name.as_deref(),
            PlatformRegistration::AppleTemplate(t) => t.template_name.as_deref(),
            PlatformRegistration::AdmTemplate(t) => t.template_name.as_deref(),
            PlatformRegistration::BaiduTemplate(t) => t.template_name.as_deref(),
            PlatformRegistration::FcmTemplate(t) => t.template_name.as_deref(),
            PlatformRegistration::BrowserTemplate(t) => t.template_name.as_deref(),
            _ => None,
        }
    }
}

impl RegistrationValidator for PlatformRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        match self {
            PlatformRegistration::Windows(r) => r.validate(version),
            PlatformRegistration::WindowsTemplate(r) => r.validate(version),
            PlatformRegistration::Mpns(r) => r.validate(version),
            PlatformRegistration::MpnsTemplate(r) => r.validate(version),
            PlatformRegistration::Apple(r) => r.validate(version),
            PlatformRegistration::AppleTemplate(r) => r.validate(version),
            PlatformRegistration::Adm(r) => r.validate(version),
            PlatformRegistration::AdmTemplate(r) => r.validate(version),
            PlatformRegistration::Baidu(r) => r.validate(version),
            PlatformRegistration::BaiduTemplate(r) => r.validate(version),
            PlatformRegistration::Fcm(r) => r.validate(version),
            PlatformRegistration::FcmTemplate(r) => r.validate(version),
            PlatformRegistration::Browser(r) => r.validate(version),
            PlatformRegistration::BrowserTemplate(r) => r.validate(version),
        }
    }
}

macro_rules! impl_from_platform {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PlatformRegistration {
                fn from(registration: $ty) -> Self {
                    PlatformRegistration::$variant(registration)
                }
            }
        )*
    };
}

impl_from_platform! {
    Windows => WindowsRegistration,
    WindowsTemplate => WindowsTemplateRegistration,
    Mpns => MpnsRegistration,
    MpnsTemplate => MpnsTemplateRegistration,
    Apple => AppleRegistration,
    AppleTemplate => AppleTemplateRegistration,
    Adm => AdmRegistration,
    AdmTemplate => AdmTemplateRegistration,
    Baidu => BaiduRegistration,
    BaiduTemplate => BaiduTemplateRegistration,
    Fcm => FcmRegistration,
    FcmTemplate => FcmTemplateRegistration,
    Browser => BrowserRegistration,
    BrowserTemplate => BrowserTemplateRegistration,
}

/// A device's subscription to a notification hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDescription {
    /// Server-assigned or pre-reserved id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    /// Required for updates; [`ETAG_ANY`] on delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Set by the service only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,
    #[serde(default)]
    tags: TagSet,
    #[serde(default, skip_serializing)]
    invalid_tags: bool,
    #[serde(default)]
    pub push_variables: BTreeMap<String, String>,
    /// Must match the client's hub when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_hub_path: Option<String>,
    pub registration: PlatformRegistration,
}

impl RegistrationDescription {
    pub fn new(registration: impl Into<PlatformRegistration>) -> Self {
        Self {
            registration_id: None,
            etag: None,
            expiration_time: None,
            tags: TagSet::new(),
            invalid_tags: false,
            push_variables: BTreeMap::new(),
            notification_hub_path: None,
            registration: registration.into(),
        }
    }

    pub fn with_registration_id(mut self, id: impl Into<String>) -> Self {
        self.registration_id = Some(id.into());
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_tags(tags);
        self
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// True when the last tag assignment was rejected and the set reset
    pub fn invalid_tags(&self) -> bool {
        self.invalid_tags
    }

    /// Replaces the tags. A set that fails the tag-list grammar or holds an
    /// over-long tag is discarded: tags become empty and
    /// [`invalid_tags`](Self::invalid_tags) is raised. No error is returned.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: TagSet = tags.into_iter().map(Into::into).collect();
        self.apply_tags(set);
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let mut set = self.tags.clone();
        set.insert(tag);
        self.apply_tags(set);
    }

    /// Comma-joined wire form of the tags
    pub fn tags_string(&self) -> String {
        self.tags.to_tags_string()
    }

    /// Validating setter for the wire form; see [`set_tags`](Self::set_tags)
    pub fn set_tags_string(&mut self, tags: &str) {
        if !tags::validate_tags(tags) {
            self.reset_tags(tags);
            return;
        }
        self.apply_tags(TagSet::from_tags_string(tags));
    }

    /// Assigns the wire form as-is, e.g. when reading a service response
    pub fn set_tags_string_unvalidated(&mut self, tags: &str) {
        self.tags = TagSet::from_tags_string(tags);
    }

    fn apply_tags(&mut self, set: TagSet) {
        let joined = set.to_tags_string();
        let too_long = set.iter().any(|tag| tag.chars().count() > MAX_TAG_LENGTH);
        if too_long || !tags::validate_tags(&joined) {
            self.reset_tags(&joined);
            return;
        }
        self.tags = set;
        self.invalid_tags = false;
    }

    fn reset_tags(&mut self, rejected: &str) {
        warn!(
            tag_count = tags::tag_count(rejected),
            "Discarding registration tags that fail the tag grammar"
        );
        self.tags.clear();
        self.invalid_tags = true;
    }

    /// Push variables as the JSON object carried in the property bag
    pub fn property_bag_string(&self) -> Option<String> {
        if self.push_variables.is_empty() {
            return None;
        }
        let map: Map<String, Value> = self
            .push_variables
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Some(Value::Object(map).to_string())
    }

    pub fn set_property_bag_string(&mut self, bag: &str) -> Result<()> {
        if bag.trim().is_empty() {
            self.push_variables.clear();
            return Ok(());
        }
        self.push_variables = serde_json::from_str(bag).map_err(|e| {
            ValidationError::malformed(
                "InvalidPropertyBag",
                format!("push variables must be a JSON object of strings: {}", e),
            )
        })?;
        Ok(())
    }

    /// Rejects server-only fields, then runs the platform checks
    pub fn validate(&self, version: ApiVersion, check_expiration_time: bool) -> Result<()> {
        if check_expiration_time && self.expiration_time.is_some() {
            return Err(ValidationError::InvalidDataContract {
                reason: "ExpirationTimeSetByClient",
                message: "ExpirationTime is set by the service and must be empty".to_string(),
            });
        }

        self.registration.validate(version).map_err(|e| {
            debug!(
                reason = e.reason(),
                platform = self.registration.platform(),
                "Registration failed validation"
            );
            e
        })
    }

    /// Hub path must be empty or name the client's hub (ignoring case)
    pub fn validate_hub_path(&self, hub_path: &str) -> Result<()> {
        match self.notification_hub_path.as_deref() {
            Some(path) if !path.is_empty() && !path.eq_ignore_ascii_case(hub_path) => {
                Err(ValidationError::InvalidDataContract {
                    reason: "NotificationHubPathMismatch",
                    message: format!(
                        "registration belongs to hub '{}', client is bound to '{}'",
                        path, hub_path
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}
