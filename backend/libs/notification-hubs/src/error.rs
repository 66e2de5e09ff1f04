//! Validation error types
//!
//! Every check in this crate fails fast with a [`ValidationError`]. Each
//! variant carries a stable reason key (see [`ValidationError::reason`])
//! so callers can branch on the failure without parsing messages.

use thiserror::Error;

/// Result type alias for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validation failure raised before an entity is sent to the hub
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory property is absent or blank
    #[error("{reason}: {field} must be specified")]
    MissingRequiredField { reason: &'static str, field: String },

    /// Both or neither of an either/or pair is set
    #[error("{reason}: {message}")]
    MutuallyExclusiveFields {
        reason: &'static str,
        message: String,
    },

    /// Property present outside a fixed whitelist
    #[error("{reason}: only {allowed} properties are required, unexpected property '{property}'")]
    DisallowedExtraField {
        reason: &'static str,
        property: String,
        allowed: String,
    },

    /// URL is malformed or not on the allow-list
    #[error("{reason}: '{value}' is not a valid value for {field}")]
    InvalidUrlOrEndpoint {
        reason: &'static str,
        field: String,
        value: String,
    },

    /// Body template or header is neither valid XML nor JSON in the expected shape
    #[error("{reason}: {message}")]
    MalformedPayload {
        reason: &'static str,
        message: String,
    },

    /// Template expression fails the grammar or cannot be located in the body
    #[error("{reason}: the expression '{expression}' is not supported")]
    UnsupportedExpression {
        reason: &'static str,
        expression: String,
    },

    /// Fixed maximum exceeded
    #[error("{reason}: {field} exceeds the limit of {limit}")]
    LimitExceeded {
        reason: &'static str,
        field: String,
        limit: usize,
    },

    /// Certificate cannot be decoded or is outside its validity window
    #[error("{reason}: {message}")]
    CredentialUnusable {
        reason: &'static str,
        message: String,
    },

    /// Tag or tag expression does not match the tag grammar
    #[error("{reason}: {message}")]
    InvalidTagSyntax {
        reason: &'static str,
        message: String,
    },

    /// Client supplied a field only the service may set, or a field that
    /// contradicts the client configuration
    #[error("{reason}: {message}")]
    InvalidDataContract {
        reason: &'static str,
        message: String,
    },

    /// Platform handle (device token, channel URI, ...) is malformed
    #[error("{reason}: {message}")]
    InvalidHandle {
        reason: &'static str,
        message: String,
    },
}

impl ValidationError {
    pub fn missing(reason: &'static str, field: impl Into<String>) -> Self {
        ValidationError::MissingRequiredField {
            reason,
            field: field.into(),
        }
    }

    pub fn malformed(reason: &'static str, message: impl Into<String>) -> Self {
        ValidationError::MalformedPayload {
            reason,
            message: message.into(),
        }
    }

    pub fn unsupported_expression(expression: impl Into<String>) -> Self {
        ValidationError::UnsupportedExpression {
            reason: "UnsupportedExpression",
            expression: expression.into(),
        }
    }

    pub fn invalid_url(
        reason: &'static str,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidUrlOrEndpoint {
            reason,
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn credential_unusable(message: impl Into<String>) -> Self {
        ValidationError::CredentialUnusable {
            reason: "ApnsCertificateNotUsable",
            message: message.into(),
        }
    }

    pub fn invalid_handle(reason: &'static str, message: impl Into<String>) -> Self {
        ValidationError::InvalidHandle {
            reason,
            message: message.into(),
        }
    }

    /// Stable reason key, e.g. `ApnsPropertiesNotSpecified`
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { reason, .. }
            | ValidationError::MutuallyExclusiveFields { reason, .. }
            | ValidationError::DisallowedExtraField { reason, .. }
            | ValidationError::InvalidUrlOrEndpoint { reason, .. }
            | ValidationError::MalformedPayload { reason, .. }
            | ValidationError::UnsupportedExpression { reason, .. }
            | ValidationError::LimitExceeded { reason, .. }
            | ValidationError::CredentialUnusable { reason, .. }
            | ValidationError::InvalidTagSyntax { reason, .. }
            | ValidationError::InvalidDataContract { reason, .. }
            | ValidationError::InvalidHandle { reason, .. } => reason,
        }
    }
}
