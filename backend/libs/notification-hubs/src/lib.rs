//! Notification Hubs client validation core
//!
//! Checks that run locally before a registration or hub credential is sent
//! to the Notification Hubs management API:
//! - Tag lists and tag expressions
//! - Per-platform registrations, native and template, including template
//!   body shape, header collections and template expressions
//! - WNS/MPNS type header inference from the body template
//! - Hub credentials for ADM, APNs, Baidu, FCM and WNS, including URL
//!   allow-lists and APNs certificate validity
//!
//! Validation is synchronous and fails fast with a [`ValidationError`]
//! carrying a stable reason key.

pub mod api_version;
pub mod config;
pub mod credentials;
pub mod error;
pub mod expression;
pub mod headers;
pub mod payload;
pub mod registration;
pub mod sdk_helper;
pub mod tags;
pub mod telemetry;

pub use api_version::ApiVersion;
pub use crate::config::{ConfigError, ConnectionString, HubSettings};
pub use credentials::{
    AdmCredential, ApnsCredential, BaiduCredential, FcmCredential, PnsCredential,
    PnsCredentialProperties, PnsCredentialValidator, WnsCredential,
};
pub use error::{Result, ValidationError};
pub use expression::ExpressionType;
pub use headers::{ApnsHeaderCollection, HeaderCollection, MpnsHeaderCollection, WnsHeaderCollection};
pub use payload::TemplateExpression;
pub use registration::{PlatformRegistration, RegistrationDescription, RegistrationValidator, ETAG_ANY};
pub use sdk_helper::{infer_headers, validate_registration, validate_registration_for_hub};
pub use tags::{TagExpression, TagSet};
