use serde::Deserialize;

use crate::gallery::NodeImageVersion;

/// One page of `Microsoft.ContainerService/locations/{location}/nodeImageVersions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeImageVersionsPage {
    #[serde(default)]
    pub value: Vec<RawNodeImageVersion>,
    #[serde(default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodeImageVersion {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl RawNodeImageVersion {
    /// `None` when the service left out any identifying field.
    pub fn into_version(self) -> Option<NodeImageVersion> {
        Some(NodeImageVersion {
            full_name: self.full_name?,
            os: self.os?,
            sku: self.sku?,
            version: self.version?,
        })
    }
}
