use super::{
    AKS_UBUNTU_GALLERY_NAME, AKS_UBUNTU_PUBLIC_GALLERY_URL, AKS_UBUNTU_RESOURCE_GROUP, CatalogEntry,
    DefaultImageOutput, FipsMode, Galleries, build_catalog, build_fips_catalog,
};
use crate::requirements::{Architecture, HyperVGeneration, Requirements};

const UBUNTU_GALLERIES: Galleries = Galleries {
    public_gallery_url: AKS_UBUNTU_PUBLIC_GALLERY_URL,
    resource_group: AKS_UBUNTU_RESOURCE_GROUP,
    gallery_name: AKS_UBUNTU_GALLERY_NAME,
};

const AMD64_GEN2: Requirements = Requirements::new(Architecture::Amd64, HyperVGeneration::V2);
const AMD64_GEN1: Requirements = Requirements::new(Architecture::Amd64, HyperVGeneration::V1);
const ARM64_GEN2: Requirements = Requirements::new(Architecture::Arm64, HyperVGeneration::V2);

// Gen2 first, Gen1 as fallback for older VM sizes, then Arm64.
const UBUNTU_2204: &[CatalogEntry] = &[
    CatalogEntry {
        image_definition: "2204gen2containerd",
        distro: "aks-ubuntu-containerd-22.04-gen2",
        requirements: AMD64_GEN2,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "2204containerd",
        distro: "aks-ubuntu-containerd-22.04",
        requirements: AMD64_GEN1,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "2204gen2arm64containerd",
        distro: "aks-ubuntu-arm64-containerd-22.04-gen2",
        requirements: ARM64_GEN2,
        sig_only: false,
    },
];

const UBUNTU_2204_FIPS: &[CatalogEntry] = &[
    CatalogEntry {
        image_definition: "2204gen2fipscontainerd",
        distro: "aks-ubuntu-fips-containerd-22.04-gen2",
        requirements: AMD64_GEN2,
        sig_only: true,
    },
    CatalogEntry {
        image_definition: "2204fipscontainerd",
        distro: "aks-ubuntu-fips-containerd-22.04",
        requirements: AMD64_GEN1,
        sig_only: true,
    },
];

const UBUNTU_2404: &[CatalogEntry] = &[
    CatalogEntry {
        image_definition: "2404gen2containerd",
        distro: "aks-ubuntu-containerd-24.04-gen2",
        requirements: AMD64_GEN2,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "2404containerd",
        distro: "aks-ubuntu-containerd-24.04",
        requirements: AMD64_GEN1,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "2404gen2arm64containerd",
        distro: "aks-ubuntu-arm64-containerd-24.04-gen2",
        requirements: ARM64_GEN2,
        sig_only: false,
    },
];

pub fn ubuntu_2204_images(use_sig: bool, fips_mode: FipsMode) -> Vec<DefaultImageOutput> {
    match fips_mode {
        FipsMode::Fips => build_fips_catalog(&UBUNTU_GALLERIES, UBUNTU_2204_FIPS, use_sig),
        FipsMode::Disabled => build_catalog(&UBUNTU_GALLERIES, UBUNTU_2204, use_sig),
    }
}

/// Ubuntu 24.04 has no FIPS images.
pub fn ubuntu_2404_images(use_sig: bool, fips_mode: FipsMode) -> Vec<DefaultImageOutput> {
    match fips_mode {
        FipsMode::Fips => Vec::new(),
        FipsMode::Disabled => build_catalog(&UBUNTU_GALLERIES, UBUNTU_2404, use_sig),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagefamily::GalleryRef;

    fn definitions(images: &[DefaultImageOutput]) -> Vec<&'static str> {
        images.iter().map(|i| i.image_definition()).collect()
    }

    #[test]
    fn ubuntu_2204_priority_order() {
        let images = ubuntu_2204_images(false, FipsMode::Disabled);
        assert_eq!(
            definitions(&images),
            vec!["2204gen2containerd", "2204containerd", "2204gen2arm64containerd"]
        );
        assert_eq!(images[0].requirements(), AMD64_GEN2);
        assert_eq!(
            images[0].gallery(),
            GalleryRef::Community {
                public_gallery_url: AKS_UBUNTU_PUBLIC_GALLERY_URL
            }
        );
    }

    #[test]
    fn ubuntu_2204_fips_through_sig() {
        let images = ubuntu_2204_images(true, FipsMode::Fips);
        assert_eq!(
            definitions(&images),
            vec!["2204gen2fipscontainerd", "2204fipscontainerd"]
        );
        assert_eq!(
            images[0].gallery(),
            GalleryRef::Shared {
                resource_group: AKS_UBUNTU_RESOURCE_GROUP,
                gallery_name: AKS_UBUNTU_GALLERY_NAME,
            }
        );
    }

    #[test]
    fn ubuntu_2404_has_no_fips() {
        assert!(ubuntu_2404_images(true, FipsMode::Fips).is_empty());
        assert_eq!(ubuntu_2404_images(true, FipsMode::Disabled).len(), 3);
    }
}
