//! Microsoft Push Notification Service (Windows Phone) registrations

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;
use url::Url;

use super::template;
use super::RegistrationValidator;
use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};
use crate::headers::{MpnsHeaderCollection, MPNS_NOTIFICATION_CLASS, MPNS_TYPE};
use crate::payload::{self, TemplateExpression};

/// Namespace of the `<wp:Notification>` envelope
pub const MPNS_NOTIFICATION_NAMESPACE: &str = "WPNotification";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpnsRegistration {
    pub channel_uri: String,
}

impl MpnsRegistration {
    pub fn new(channel_uri: impl Into<String>) -> Self {
        Self {
            channel_uri: channel_uri.into(),
        }
    }
}

impl RegistrationValidator for MpnsRegistration {
    fn validate(&self, _version: ApiVersion) -> Result<()> {
        validate_channel_uri(&self.channel_uri)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpnsTemplateRegistration {
    pub channel_uri: String,
    pub body_template: String,
    #[serde(default)]
    pub mpns_headers: MpnsHeaderCollection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<TemplateExpression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpnsTemplateBodyType {
    Toast,
    Tile,
    Raw,
}

impl MpnsTemplateBodyType {
    /// `X-WindowsPhone-Target` value; raw notifications carry none
    pub fn target(&self) -> Option<&'static str> {
        match self {
            MpnsTemplateBodyType::Toast => Some("toast"),
            MpnsTemplateBodyType::Tile => Some("token"),
            MpnsTemplateBodyType::Raw => None,
        }
    }

    /// Immediate-delivery notification class
    pub fn notification_class(&self) -> &'static str {
        match self {
            MpnsTemplateBodyType::Tile => "1",
            MpnsTemplateBodyType::Toast => "2",
            MpnsTemplateBodyType::Raw => "3",
        }
    }
}

impl FromStr for MpnsTemplateBodyType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toast" => Ok(MpnsTemplateBodyType::Toast),
            "tile" => Ok(MpnsTemplateBodyType::Tile),
            "raw" => Ok(MpnsTemplateBodyType::Raw),
            _ => Err(()),
        }
    }
}

/// Notification classes 3-10, 13-20 and 23-31 denote raw notifications
pub fn is_raw_notification_class(class: u32) -> bool {
    matches!(class, 3..=10 | 13..=20 | 23..=31)
}

/// Expects `<Notification xmlns="WPNotification">` whose first child names the type
pub fn detect_mpns_template_registration_type(
    body: &str,
    error_reason: &'static str,
) -> Result<MpnsTemplateBodyType> {
    let root = payload::parse_xml(body, error_reason)?;
    let unsupported = || {
        ValidationError::malformed(
            error_reason,
            "body template must be a WPNotification Notification element",
        )
    };

    if root.namespace.as_deref() != Some(MPNS_NOTIFICATION_NAMESPACE)
        || root.local_name != "Notification"
    {
        return Err(unsupported());
    }

    root.first_child()
        .and_then(|child| child.local_name.parse().ok())
        .ok_or_else(unsupported)
}

impl MpnsTemplateRegistration {
    pub fn new(channel_uri: impl Into<String>, body_template: impl Into<String>) -> Self {
        Self {
            channel_uri: channel_uri.into(),
            body_template: body_template.into(),
            mpns_headers: MpnsHeaderCollection::new(),
            template_name: None,
            expressions: Vec::new(),
        }
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    fn declares_raw_class(&self) -> bool {
        self.mpns_headers
            .get(MPNS_NOTIFICATION_CLASS)
            .and_then(|class| class.trim().parse::<u32>().ok())
            .map_or(false, is_raw_notification_class)
    }

    /// Returns a copy with `X-WindowsPhone-Target` and `X-NotificationClass`
    /// derived from an XML body; existing headers are never overwritten
    pub fn with_inferred_type(&self) -> Result<Self> {
        let mut inferred = self.clone();
        if self.declares_raw_class() || !payload::is_xml_payload(&self.body_template) {
            return Ok(inferred);
        }

        let body_type =
            detect_mpns_template_registration_type(&self.body_template, "NotSupportedXmlFormat")?;
        if let Some(target) = body_type.target() {
            inferred.mpns_headers.insert_if_absent(MPNS_TYPE, target);
        }
        inferred
            .mpns_headers
            .insert_if_absent(MPNS_NOTIFICATION_CLASS, body_type.notification_class());
        debug!(mpns_type = ?body_type, "Inferred MPNS headers from body template");
        Ok(inferred)
    }

    pub fn scan(&self, version: ApiVersion) -> Result<Vec<TemplateExpression>> {
        validate_channel_uri(&self.channel_uri)?;
        template::require_header(&self.mpns_headers, MPNS_NOTIFICATION_CLASS)?;
        template::validate_header_values(&self.mpns_headers, version)?;
        let expressions = template::scan_xml_or_json_body(&self.body_template, version)?;
        template::validate_template_name(self.template_name.as_deref())?;
        Ok(expressions)
    }
}

impl RegistrationValidator for MpnsTemplateRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        self.scan(version).map(|_| ())
    }
}

fn validate_channel_uri(channel_uri: &str) -> Result<()> {
    match Url::parse(channel_uri) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::invalid_handle(
            "InvalidChannelUri",
            "MPNS channel URI must be an absolute http or https URI",
        )),
    }
}
