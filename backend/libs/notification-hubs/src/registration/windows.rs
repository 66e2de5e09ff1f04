//! Windows Push Notification Services (WNS) registrations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use url::Url;

use super::template;
use super::RegistrationValidator;
use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};
use crate::headers::{WnsHeaderCollection, WNS_TYPE};
use crate::payload::{self, TemplateExpression};

/// Native WNS registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsRegistration {
    pub channel_uri: String,
}

impl WindowsRegistration {
    pub fn new(channel_uri: impl Into<String>) -> Self {
        Self {
            channel_uri: channel_uri.into(),
        }
    }
}

impl RegistrationValidator for WindowsRegistration {
    fn validate(&self, _version: ApiVersion) -> Result<()> {
        validate_channel_uri(&self.channel_uri)
    }
}

/// WNS template registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsTemplateRegistration {
    pub channel_uri: String,
    pub body_template: String,
    #[serde(default)]
    pub wns_headers: WnsHeaderCollection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    /// Filled in by the registration pipeline once the body is validated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<TemplateExpression>,
}

/// Kind of WNS notification a body template produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowsTemplateBodyType {
    Toast,
    Tile,
    Badge,
    Raw,
}

impl WindowsTemplateBodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowsTemplateBodyType::Toast => "toast",
            WindowsTemplateBodyType::Tile => "tile",
            WindowsTemplateBodyType::Badge => "badge",
            WindowsTemplateBodyType::Raw => "raw",
        }
    }
}

impl fmt::Display for WindowsTemplateBodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowsTemplateBodyType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toast" => Ok(WindowsTemplateBodyType::Toast),
            "tile" => Ok(WindowsTemplateBodyType::Tile),
            "badge" => Ok(WindowsTemplateBodyType::Badge),
            "raw" => Ok(WindowsTemplateBodyType::Raw),
            _ => Err(()),
        }
    }
}

/// Reads the notification type off the root element of an XML body
pub fn detect_windows_template_registration_type(
    body: &str,
    error_reason: &'static str,
) -> Result<WindowsTemplateBodyType> {
    let root = payload::parse_xml(body, error_reason)?;
    root.local_name.parse().map_err(|_| {
        ValidationError::malformed(
            error_reason,
            format!("'{}' is not a supported WNS notification element", root.local_name),
        )
    })
}

impl WindowsTemplateRegistration {
    pub fn new(channel_uri: impl Into<String>, body_template: impl Into<String>) -> Self {
        Self {
            channel_uri: channel_uri.into(),
            body_template: body_template.into(),
            wns_headers: WnsHeaderCollection::new(),
            template_name: None,
            expressions: Vec::new(),
        }
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn is_raw(&self) -> bool {
        self.wns_headers.get(WNS_TYPE).map_or(false, |value| {
            let value = value.trim();
            value.eq_ignore_ascii_case("raw") || value.eq_ignore_ascii_case("wns/raw")
        })
    }

    /// Returns a copy with the `X-WNS-Type` header derived from the body
    ///
    /// JSON bodies are left alone. A raw template only needs a well-formed
    /// XML body. An existing type header is never overwritten.
    pub fn with_inferred_type(&self) -> Result<Self> {
        let mut inferred = self.clone();
        if payload::is_json_object_payload(&self.body_template) {
            return Ok(inferred);
        }

        if self.is_raw() {
            payload::parse_xml(&self.body_template, "NotSupportedXmlFormat")?;
            return Ok(inferred);
        }

        let body_type =
            detect_windows_template_registration_type(&self.body_template, "NotSupportedXmlFormat")?;
        if inferred.wns_headers.insert_if_absent(WNS_TYPE, body_type.as_str()) {
            debug!(wns_type = %body_type, "Inferred WNS type header from body template");
        }
        Ok(inferred)
    }

    /// Full validation; returns the expressions located in an XML body
    pub fn scan(&self, version: ApiVersion) -> Result<Vec<TemplateExpression>> {
        validate_channel_uri(&self.channel_uri)?;
        template::require_header(&self.wns_headers, WNS_TYPE)?;
        template::validate_header_values(&self.wns_headers, version)?;
        let expressions = template::scan_xml_or_json_body(&self.body_template, version)?;
        template::validate_template_name(self.template_name.as_deref())?;
        Ok(expressions)
    }
}

impl RegistrationValidator for WindowsTemplateRegistration {
    fn validate(&self, version: ApiVersion) -> Result<()> {
        self.scan(version).map(|_| ())
    }
}

fn validate_channel_uri(channel_uri: &str) -> Result<()> {
    match Url::parse(channel_uri) {
        Ok(url) if url.scheme() == "https" => Ok(()),
        _ => Err(ValidationError::invalid_handle(
            "InvalidChannelUri",
            "WNS channel URI must be an absolute https URI",
        )),
    }
}
