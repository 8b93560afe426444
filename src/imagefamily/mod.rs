//! Image families and their candidate image catalogs.
//!
//! Every family returns its candidates in selection priority order. Callers
//! take the first candidate whose [`Requirements`] fit an instance type, so
//! reordering a catalog changes which image nodes boot.

pub mod azure_linux;
pub mod ubuntu;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::requirements::Requirements;
use crate::version::KubernetesVersion;

pub const AKS_UBUNTU_PUBLIC_GALLERY_URL: &str = "AKSUbuntu-38d80f77-467a-481f-a8d4-09b6d4220bd2";
pub const AKS_AZURE_LINUX_PUBLIC_GALLERY_URL: &str =
    "AKSAzureLinux-f7c7cda5-1c9a-4bdc-a222-9614c968580b";

pub const AKS_UBUNTU_RESOURCE_GROUP: &str = "AKS-Ubuntu";
pub const AKS_AZURE_LINUX_RESOURCE_GROUP: &str = "AKS-AzureLinux";

pub const AKS_UBUNTU_GALLERY_NAME: &str = "AKSUbuntu";
pub const AKS_AZURE_LINUX_GALLERY_NAME: &str = "AKSAzureLinux";

/// Azure Linux 3 images are used from this Kubernetes minor onwards.
const AZURE_LINUX_3_MIN_KUBERNETES: (u64, u64) = (1, 32);

/// Whether FIPS certified images are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FipsMode {
    #[default]
    Disabled,
    #[serde(rename = "FIPS")]
    Fips,
}

/// Where a candidate image is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GalleryRef {
    Community {
        public_gallery_url: &'static str,
    },
    Shared {
        resource_group: &'static str,
        gallery_name: &'static str,
    },
}

/// A candidate image of a family, before its latest version is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DefaultImageOutput {
    gallery: GalleryRef,
    image_definition: &'static str,
    distro: &'static str,
    requirements: Requirements,
}

impl DefaultImageOutput {
    pub fn new(
        gallery: GalleryRef,
        image_definition: &'static str,
        distro: &'static str,
        requirements: Requirements,
    ) -> Self {
        Self {
            gallery,
            image_definition,
            distro,
            requirements,
        }
    }

    pub fn gallery(&self) -> GalleryRef {
        self.gallery
    }

    /// Image definition name, which is also the SKU in node image listings.
    pub fn image_definition(&self) -> &'static str {
        self.image_definition
    }

    pub fn distro(&self) -> &'static str {
        self.distro
    }

    pub fn requirements(&self) -> Requirements {
        self.requirements
    }

    /// Fully qualified image resource ID for `version` of this image.
    ///
    /// `subscription` is only used for shared gallery images.
    pub fn image_id(&self, subscription: &str, version: &str) -> String {
        match self.gallery {
            GalleryRef::Community { public_gallery_url } => format!(
                "/CommunityGalleries/{public_gallery_url}/images/{}/versions/{version}",
                self.image_definition
            ),
            GalleryRef::Shared {
                resource_group,
                gallery_name,
            } => format!(
                "/subscriptions/{subscription}/resourceGroups/{resource_group}/providers/Microsoft.Compute/galleries/{gallery_name}/images/{}/versions/{version}",
                self.image_definition
            ),
        }
    }
}

/// One row of a compiled-in catalog.
pub(crate) struct CatalogEntry {
    pub(crate) image_definition: &'static str,
    pub(crate) distro: &'static str,
    pub(crate) requirements: Requirements,
    /// Published to the shared gallery only.
    pub(crate) sig_only: bool,
}

/// Publishing locations of one distro.
pub(crate) struct Galleries {
    pub(crate) public_gallery_url: &'static str,
    pub(crate) resource_group: &'static str,
    pub(crate) gallery_name: &'static str,
}

impl Galleries {
    fn gallery_ref(&self, use_sig: bool) -> GalleryRef {
        if use_sig {
            GalleryRef::Shared {
                resource_group: self.resource_group,
                gallery_name: self.gallery_name,
            }
        } else {
            GalleryRef::Community {
                public_gallery_url: self.public_gallery_url,
            }
        }
    }
}

/// Expand catalog rows into candidates for one backend, keeping row order.
pub(crate) fn build_catalog(
    galleries: &Galleries,
    entries: &[CatalogEntry],
    use_sig: bool,
) -> Vec<DefaultImageOutput> {
    let gallery = galleries.gallery_ref(use_sig);
    entries
        .iter()
        .filter(|e| use_sig || !e.sig_only)
        .map(|e| DefaultImageOutput::new(gallery, e.image_definition, e.distro, e.requirements))
        .collect()
}

/// Expand FIPS rows. FIPS images are never published to community galleries.
pub(crate) fn build_fips_catalog(
    galleries: &Galleries,
    entries: &[CatalogEntry],
    use_sig: bool,
) -> Vec<DefaultImageOutput> {
    if !use_sig {
        return Vec::new();
    }
    build_catalog(galleries, entries, true)
}

/// The OS image families nodes can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFamily {
    Ubuntu2204,
    Ubuntu2404,
    AzureLinux,
    AzureLinux3,
}

/// Family names accepted on a node class, matched case-insensitively.
const FAMILY_NAMES: &[(&str, ImageFamily)] = &[
    ("Ubuntu", ImageFamily::Ubuntu2204),
    ("Ubuntu2204", ImageFamily::Ubuntu2204),
    ("Ubuntu2404", ImageFamily::Ubuntu2404),
    ("AzureLinux", ImageFamily::AzureLinux),
];

pub const DEFAULT_IMAGE_FAMILY: ImageFamily = ImageFamily::Ubuntu2204;

impl ImageFamily {
    /// Pick the family for a node class.
    ///
    /// Unknown or missing names fall back to [`DEFAULT_IMAGE_FAMILY`]. Azure
    /// Linux switches to its v3 images from Kubernetes 1.32 on.
    pub fn resolve(name: Option<&str>, kubernetes_version: &KubernetesVersion) -> ImageFamily {
        let family = match name {
            Some(name) => FAMILY_NAMES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(name))
                .map(|(_, family)| *family)
                .unwrap_or_else(|| {
                    debug!(family = name, "unknown image family, using default");
                    DEFAULT_IMAGE_FAMILY
                }),
            None => DEFAULT_IMAGE_FAMILY,
        };

        let (major, minor) = AZURE_LINUX_3_MIN_KUBERNETES;
        match family {
            ImageFamily::AzureLinux if kubernetes_version.at_least(major, minor) => {
                ImageFamily::AzureLinux3
            }
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImageFamily::Ubuntu2204 => "Ubuntu2204",
            ImageFamily::Ubuntu2404 => "Ubuntu2404",
            ImageFamily::AzureLinux | ImageFamily::AzureLinux3 => "AzureLinux",
        }
    }

    /// Candidates in selection priority order.
    pub fn default_images(&self, use_sig: bool, fips_mode: FipsMode) -> Vec<DefaultImageOutput> {
        match self {
            ImageFamily::Ubuntu2204 => ubuntu::ubuntu_2204_images(use_sig, fips_mode),
            ImageFamily::Ubuntu2404 => ubuntu::ubuntu_2404_images(use_sig, fips_mode),
            ImageFamily::AzureLinux => azure_linux::azure_linux_2_images(use_sig, fips_mode),
            ImageFamily::AzureLinux3 => azure_linux::azure_linux_3_images(use_sig, fips_mode),
        }
    }
}

impl fmt::Display for ImageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::{Architecture, HyperVGeneration};

    fn k8s(v: &str) -> KubernetesVersion {
        KubernetesVersion::parse(v).expect("valid kubernetes version")
    }

    #[test]
    fn resolve_family_names() {
        let v = k8s("1.31.0");
        assert_eq!(ImageFamily::resolve(Some("Ubuntu"), &v), ImageFamily::Ubuntu2204);
        assert_eq!(ImageFamily::resolve(Some("ubuntu2404"), &v), ImageFamily::Ubuntu2404);
        assert_eq!(ImageFamily::resolve(Some("AzureLinux"), &v), ImageFamily::AzureLinux);
        assert_eq!(ImageFamily::resolve(None, &v), DEFAULT_IMAGE_FAMILY);
        assert_eq!(ImageFamily::resolve(Some("Windows2022"), &v), DEFAULT_IMAGE_FAMILY);
    }

    #[test]
    fn azure_linux_3_from_kubernetes_1_32() {
        assert_eq!(
            ImageFamily::resolve(Some("AzureLinux"), &k8s("v1.31.9")),
            ImageFamily::AzureLinux
        );
        assert_eq!(
            ImageFamily::resolve(Some("AzureLinux"), &k8s("v1.32.0")),
            ImageFamily::AzureLinux3
        );
        assert_eq!(
            ImageFamily::resolve(Some("AzureLinux"), &k8s("1.33")),
            ImageFamily::AzureLinux3
        );
        // Ubuntu does not change with the version.
        assert_eq!(
            ImageFamily::resolve(Some("Ubuntu2204"), &k8s("1.33")),
            ImageFamily::Ubuntu2204
        );
    }

    #[test]
    fn community_image_id_format() {
        let image = DefaultImageOutput::new(
            GalleryRef::Community {
                public_gallery_url: AKS_UBUNTU_PUBLIC_GALLERY_URL,
            },
            "2204gen2containerd",
            "aks-ubuntu-containerd-22.04-gen2",
            Requirements::new(Architecture::Amd64, HyperVGeneration::V2),
        );
        assert_eq!(
            image.image_id("ignored", "202411.12.0"),
            "/CommunityGalleries/AKSUbuntu-38d80f77-467a-481f-a8d4-09b6d4220bd2/images/2204gen2containerd/versions/202411.12.0"
        );
    }

    #[test]
    fn shared_image_id_format() {
        let image = DefaultImageOutput::new(
            GalleryRef::Shared {
                resource_group: AKS_AZURE_LINUX_RESOURCE_GROUP,
                gallery_name: AKS_AZURE_LINUX_GALLERY_NAME,
            },
            "V3gen2",
            "aks-azurelinux-v3-gen2",
            Requirements::new(Architecture::Amd64, HyperVGeneration::V2),
        );
        assert_eq!(
            image.image_id("10945678-1234-1234-1234-123456789012", "202501.05.0"),
            "/subscriptions/10945678-1234-1234-1234-123456789012/resourceGroups/AKS-AzureLinux/providers/Microsoft.Compute/galleries/AKSAzureLinux/images/V3gen2/versions/202501.05.0"
        );
    }

    #[test]
    fn fips_is_never_served_by_community_galleries() {
        for family in [
            ImageFamily::Ubuntu2204,
            ImageFamily::Ubuntu2404,
            ImageFamily::AzureLinux,
            ImageFamily::AzureLinux3,
        ] {
            assert!(
                family.default_images(false, FipsMode::Fips).is_empty(),
                "{family} returned community FIPS images"
            );
        }
    }

    #[test]
    fn backend_matches_gallery_kind() {
        for family in [ImageFamily::Ubuntu2204, ImageFamily::AzureLinux3] {
            for image in family.default_images(true, FipsMode::Disabled) {
                assert!(matches!(image.gallery(), GalleryRef::Shared { .. }));
            }
            for image in family.default_images(false, FipsMode::Disabled) {
                assert!(matches!(image.gallery(), GalleryRef::Community { .. }));
            }
        }
    }
}
