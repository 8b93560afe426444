use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cache::{DEFAULT_IMAGE_EXPIRATION, DEFAULT_SWEEP_INTERVAL};

pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_COMMUNITY_API_VERSION: &str = "2022-03-03";
pub const DEFAULT_NODE_IMAGE_API_VERSION: &str = "2024-04-02-preview";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

fn default_management_endpoint() -> String {
    DEFAULT_MANAGEMENT_ENDPOINT.to_string()
}

fn default_community_api_version() -> String {
    DEFAULT_COMMUNITY_API_VERSION.to_string()
}

fn default_node_image_api_version() -> String {
    DEFAULT_NODE_IMAGE_API_VERSION.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_IMAGE_EXPIRATION.as_secs()
}

fn default_cache_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

/// Provider settings; serde is confined to this module tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Azure region nodes are created in, e.g. `westus2`
    pub(crate) location: String,
    /// Subscription the listing calls are made against
    pub(crate) subscription_id: String,
    /// Subscription owning the AKS shared galleries
    #[serde(default)]
    pub(crate) sig_subscription_id: Option<String>,
    #[serde(default)]
    pub(crate) use_sig: bool,
    #[serde(default = "default_management_endpoint")]
    pub(crate) management_endpoint: String,
    #[serde(default = "default_community_api_version")]
    pub(crate) community_api_version: String,
    #[serde(default = "default_node_image_api_version")]
    pub(crate) node_image_api_version: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub(crate) cache_ttl_secs: u64,
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub(crate) cache_sweep_interval_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub(crate) http_timeout_secs: u64,
    /// Bearer token for management calls; acquiring it is up to the caller
    #[serde(default, skip_serializing)]
    pub(crate) access_token: Option<String>,
}

impl Settings {
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Falls back to `subscription_id` when no gallery subscription is set.
    pub fn sig_subscription_id(&self) -> &str {
        self.sig_subscription_id
            .as_deref()
            .unwrap_or(&self.subscription_id)
    }

    pub fn use_sig(&self) -> bool {
        self.use_sig
    }

    pub fn management_endpoint(&self) -> &str {
        &self.management_endpoint
    }

    pub fn community_api_version(&self) -> &str {
        &self.community_api_version
    }

    pub fn node_image_api_version(&self) -> &str {
        &self.node_image_api_version
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }
}
