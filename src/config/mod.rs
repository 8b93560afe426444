mod models;

use std::{fs, path::Path};
use url::Url;

pub use models::{
    DEFAULT_COMMUNITY_API_VERSION, DEFAULT_MANAGEMENT_ENDPOINT, DEFAULT_NODE_IMAGE_API_VERSION,
    Settings,
};

// ---- Loading ----

impl Settings {
    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&data)
    }

    /// Load settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json).map_err(ConfigError::Json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from an env var containing JSON.
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        let s = std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.to_string()))?;
        Self::from_json_str(&s)
    }

    /// Parsed management endpoint.
    pub fn management_url(&self) -> Result<Url, ConfigError> {
        Url::parse(self.management_endpoint()).map_err(|e| {
            ConfigError::Invalid(format!(
                "managementEndpoint '{}': {e}",
                self.management_endpoint()
            ))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.location.trim().is_empty() {
            return Err(ConfigError::Invalid("location must not be empty".to_string()));
        }
        if self.subscription_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "subscriptionId must not be empty".to_string(),
            ));
        }
        if self
            .sig_subscription_id
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "sigSubscriptionId must not be empty when set".to_string(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid("cacheTtlSecs must be positive".to_string()));
        }
        if self.cache_sweep_interval_secs == 0 || self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "cacheSweepIntervalSecs and httpTimeoutSecs must be positive".to_string(),
            ));
        }
        self.management_url()?;
        Ok(())
    }
}

/// ---- Errors ----
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("invalid settings: {0}")]
    Invalid(String),
    #[error("reading settings file")]
    Io(#[from] std::io::Error),
    #[error("parsing settings JSON")]
    Json(#[from] serde_json::Error),
}
