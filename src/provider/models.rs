use serde::{Deserialize, Serialize};

use crate::imagefamily::FipsMode;
use crate::requirements::{InstanceCapabilities, Requirements};

/// What a node class asks of its node images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeClass {
    /// Family name such as `Ubuntu2204` or `AzureLinux`; default family when absent
    #[serde(default)]
    pub image_family: Option<String>,
    #[serde(default)]
    pub fips_mode: FipsMode,
    /// Resolve through the shared gallery instead of community galleries
    #[serde(default)]
    pub use_sig: bool,
    /// Target Kubernetes version; the cluster's version when absent
    #[serde(default)]
    pub kubernetes_version: Option<String>,
}

/// A resolved image: full resource ID plus what the image needs from a VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeImage {
    id: String,
    requirements: Requirements,
}

impl NodeImage {
    pub fn new(id: String, requirements: Requirements) -> Self {
        Self { id, requirements }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn requirements(&self) -> Requirements {
        self.requirements
    }
}

/// First image, in priority order, that the instance type can boot.
///
/// `None` is the caller's "no image found" failure.
pub fn select_image<'a>(
    images: &'a [NodeImage],
    capabilities: &InstanceCapabilities,
) -> Option<&'a NodeImage> {
    images
        .iter()
        .find(|image| image.requirements().compatible_with(capabilities))
}
