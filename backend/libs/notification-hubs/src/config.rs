//! Client configuration
//!
//! [`HubSettings`] is layered the usual way: defaults, an optional config
//! file, then `NOTIFICATION_HUBS__*` environment variables (after loading a
//! `.env` file when one exists).

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;
use validator::Validate;

use crate::api_version::ApiVersion;

const ENV_PREFIX: &str = "NOTIFICATION_HUBS";
const ENV_SEPARATOR: &str = "__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid connection string: {0}")]
    ConnectionString(String),
}

/// Parsed `Endpoint=...;SharedAccessKeyName=...;SharedAccessKey=...`
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub endpoint: Url,
    pub shared_access_key_name: String,
    pub shared_access_key: String,
}

impl ConnectionString {
    /// Keys are case-insensitive and values may themselves contain `=`
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;

        for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, val) = part.split_once('=').ok_or_else(|| {
                ConfigError::ConnectionString("every segment must be key=value".to_string())
            })?;
            let val = val.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(val),
                "sharedaccesskeyname" => key_name = Some(val),
                "sharedaccesskey" => key = Some(val),
                other => debug!(key = other, "Ignoring unknown connection string key"),
            }
        }

        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ConfigError::ConnectionString("Endpoint is required".to_string()))?;
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| ConfigError::ConnectionString(format!("Endpoint '{}': {}", endpoint, e)))?;

        match (key_name.filter(|k| !k.is_empty()), key.filter(|k| !k.is_empty())) {
            (Some(shared_access_key_name), Some(shared_access_key)) => Ok(Self {
                endpoint,
                shared_access_key_name,
                shared_access_key,
            }),
            _ => Err(ConfigError::ConnectionString(
                "SharedAccessKeyName and SharedAccessKey are required".to_string(),
            )),
        }
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint.as_str())
            .field("shared_access_key_name", &self.shared_access_key_name)
            .field("shared_access_key", &"<redacted>")
            .finish()
    }
}

/// Settings a client needs to validate and address registrations
#[derive(Clone, Deserialize, Validate)]
pub struct HubSettings {
    #[validate(length(min = 1))]
    pub connection_string: String,

    #[validate(length(min = 1, max = 260))]
    pub hub_path: String,

    #[serde(default)]
    pub api_version: ApiVersion,

    /// Admits the localhost mock PNS endpoints in credential validation
    #[serde(default)]
    pub allow_local_mock_pns: bool,
}

impl HubSettings {
    /// Loads from `config_path` (when it exists) and the environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("api_version", ApiVersion::LATEST.as_str())?
            .set_default("allow_local_mock_pns", false)?;

        if let Some(path) = config_path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let settings: HubSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        // fail at load time rather than on the first request
        settings.connection()?;

        info!(
            hub_path = %settings.hub_path,
            api_version = %settings.api_version,
            allow_local_mock_pns = settings.allow_local_mock_pns,
            "Loaded notification hub settings"
        );
        Ok(settings)
    }

    pub fn connection(&self) -> Result<ConnectionString, ConfigError> {
        ConnectionString::parse(&self.connection_string)
    }
}

impl fmt::Debug for HubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubSettings")
            .field("connection_string", &"<redacted>")
            .field("hub_path", &self.hub_path)
            .field("api_version", &self.api_version)
            .field("allow_local_mock_pns", &self.allow_local_mock_pns)
            .finish()
    }
}
