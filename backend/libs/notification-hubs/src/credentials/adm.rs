//! Amazon Device Messaging credential

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::{is_allowed_url, non_blank, reject_extra_properties, PnsCredentialProperties, PnsCredentialValidator};
use crate::error::{Result, ValidationError};

pub const ADM_AUTH_TOKEN_URL: &str = "https://api.amazon.com/auth/O2/token";
pub const ADM_SEND_URL_TEMPLATE: &str = "https://api.amazon.com/messaging/registrations/{0}/messages";
pub const ADM_INT_TEST_AUTH_TOKEN_URL: &str = "http://pushtestservice.cloudapp.net/adm/token";
pub const ADM_INT_TEST_SEND_URL_TEMPLATE: &str = "http://pushtestservice.cloudapp.net/adm/send/{0}";
pub const ADM_MOCK_AUTH_TOKEN_URL: &str = "http://localhost:8450/adm/token";
pub const ADM_MOCK_SEND_URL_TEMPLATE: &str = "http://localhost:8450/adm/send/{0}";

const CLIENT_ID: &str = "ClientId";
const CLIENT_SECRET: &str = "ClientSecret";
const AUTH_TOKEN_URL: &str = "AuthTokenUrl";
const SEND_URL_TEMPLATE: &str = "SendUrlTemplate";

const ALLOWED_PROPERTIES: [&str; 4] = [CLIENT_ID, CLIENT_SECRET, SEND_URL_TEMPLATE, AUTH_TOKEN_URL];

const PLACEHOLDER_REGISTRATION_ID: &str = "placeholder-registration-id";

/// Equality covers `client_id` and `client_secret` only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmCredential {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Defaults to [`ADM_AUTH_TOKEN_URL`] when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token_url: Option<String>,
    /// `{0}` is replaced with the ADM registration id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_url_template: Option<String>,
    /// Properties read from the wire that have no typed field
    #[serde(default, skip_serializing_if = "PnsCredentialProperties::is_empty")]
    pub additional_properties: PnsCredentialProperties,
}

impl AdmCredential {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            ..Default::default()
        }
    }

    pub fn from_properties(mut props: PnsCredentialProperties) -> Self {
        Self {
            client_id: props.take(CLIENT_ID),
            client_secret: props.take(CLIENT_SECRET),
            auth_token_url: props.take(AUTH_TOKEN_URL),
            send_url_template: props.take(SEND_URL_TEMPLATE),
            additional_properties: props,
        }
    }

    pub fn to_properties(&self) -> PnsCredentialProperties {
        let mut props = self.additional_properties.clone();
        props.set_opt(CLIENT_ID, self.client_id.as_ref());
        props.set_opt(CLIENT_SECRET, self.client_secret.as_ref());
        props.set_opt(AUTH_TOKEN_URL, self.auth_token_url.as_ref());
        props.set_opt(SEND_URL_TEMPLATE, self.send_url_template.as_ref());
        props
    }

    pub fn auth_token_url(&self) -> &str {
        non_blank(&self.auth_token_url).unwrap_or(ADM_AUTH_TOKEN_URL)
    }

    pub fn send_url_template(&self) -> &str {
        non_blank(&self.send_url_template).unwrap_or(ADM_SEND_URL_TEMPLATE)
    }
}

impl PnsCredentialValidator for AdmCredential {
    fn validate(&self, allow_local_mock_pns: bool) -> Result<()> {
        match (non_blank(&self.client_id), non_blank(&self.client_secret)) {
            (None, None) => {
                return Err(ValidationError::missing(
                    "AdmClientIdAndSecretNotSpecified",
                    "ClientId and ClientSecret",
                ))
            }
            (None, Some(_)) => return Err(ValidationError::missing("AdmClientIdNotSpecified", CLIENT_ID)),
            (Some(_), None) => {
                return Err(ValidationError::missing("AdmClientSecretNotSpecified", CLIENT_SECRET))
            }
            (Some(_), Some(_)) => {}
        }

        reject_extra_properties(
            &self.additional_properties,
            "AdmOnlyRequiredPropertiesAllowed",
            &ALLOWED_PROPERTIES,
        )?;

        if let Some(url) = non_blank(&self.auth_token_url) {
            let mut allowed = vec![ADM_AUTH_TOKEN_URL, ADM_INT_TEST_AUTH_TOKEN_URL];
            if allow_local_mock_pns {
                allowed.push(ADM_MOCK_AUTH_TOKEN_URL);
            }
            if !is_allowed_url(url, &allowed) {
                return Err(ValidationError::invalid_url(
                    "InvalidAdmAuthTokenUrl",
                    AUTH_TOKEN_URL,
                    url,
                ));
            }
        }

        if let Some(template) = non_blank(&self.send_url_template) {
            let invalid = || ValidationError::invalid_url("InvalidAdmSendUrlTemplate", SEND_URL_TEMPLATE, template);
            let url = format_send_url(template, PLACEHOLDER_REGISTRATION_ID).ok_or_else(invalid)?;

            let mut allowed = vec![ADM_SEND_URL_TEMPLATE, ADM_INT_TEST_SEND_URL_TEMPLATE];
            if allow_local_mock_pns {
                allowed.push(ADM_MOCK_SEND_URL_TEMPLATE);
            }
            let allowed: Vec<String> = allowed
                .into_iter()
                .filter_map(|t| format_send_url(t, PLACEHOLDER_REGISTRATION_ID))
                .collect();
            let allowed: Vec<&str> = allowed.iter().map(String::as_str).collect();
            if !is_allowed_url(&url, &allowed) {
                return Err(invalid());
            }
        }

        Ok(())
    }
}

impl PartialEq for AdmCredential {
    fn eq(&self, other: &Self) -> bool {
        self.client_id == other.client_id && self.client_secret == other.client_secret
    }
}

impl Eq for AdmCredential {}

impl Hash for AdmCredential {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.client_id.hash(state);
        self.client_secret.hash(state);
    }
}

/// Substitutes `{0}` the way a composite format string does; `{{` and `}}`
/// are escapes and any other placeholder is a format error (`None`)
pub fn format_send_url(template: &str, registration_id: &str) -> Option<String> {
    let mut out = String::with_capacity(template.len() + registration_id.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => placeholder.push(c),
                        None => return None,
                    }
                }
                // alignment and format suffixes are irrelevant for a string argument
                let index = placeholder.split([',', ':']).next().unwrap_or_default().trim();
                if index != "0" {
                    return None;
                }
                out.push_str(registration_id);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}
