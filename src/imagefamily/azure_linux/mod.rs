use super::{
    AKS_AZURE_LINUX_GALLERY_NAME, AKS_AZURE_LINUX_PUBLIC_GALLERY_URL,
    AKS_AZURE_LINUX_RESOURCE_GROUP, CatalogEntry, DefaultImageOutput, FipsMode, Galleries,
    build_catalog, build_fips_catalog,
};
use crate::requirements::{Architecture, HyperVGeneration, Requirements};

const AZURE_LINUX_GALLERIES: Galleries = Galleries {
    public_gallery_url: AKS_AZURE_LINUX_PUBLIC_GALLERY_URL,
    resource_group: AKS_AZURE_LINUX_RESOURCE_GROUP,
    gallery_name: AKS_AZURE_LINUX_GALLERY_NAME,
};

const AMD64_GEN2: Requirements = Requirements::new(Architecture::Amd64, HyperVGeneration::V2);
const AMD64_GEN1: Requirements = Requirements::new(Architecture::Amd64, HyperVGeneration::V1);
const ARM64_GEN2: Requirements = Requirements::new(Architecture::Arm64, HyperVGeneration::V2);

const AZURE_LINUX_2: &[CatalogEntry] = &[
    CatalogEntry {
        image_definition: "V2gen2",
        distro: "aks-azurelinux-v2-gen2",
        requirements: AMD64_GEN2,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "V2",
        distro: "aks-azurelinux-v2",
        requirements: AMD64_GEN1,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "V2gen2arm64",
        distro: "aks-azurelinux-v2-arm64-gen2",
        requirements: ARM64_GEN2,
        sig_only: false,
    },
];

const AZURE_LINUX_2_FIPS: &[CatalogEntry] = &[
    CatalogEntry {
        image_definition: "V2gen2fips",
        distro: "aks-azurelinux-v2-gen2-fips",
        requirements: AMD64_GEN2,
        sig_only: true,
    },
    CatalogEntry {
        image_definition: "V2fips",
        distro: "aks-azurelinux-v2-fips",
        requirements: AMD64_GEN1,
        sig_only: true,
    },
];

// The v3 arm64 image is not published to the community gallery.
const AZURE_LINUX_3: &[CatalogEntry] = &[
    CatalogEntry {
        image_definition: "V3gen2",
        distro: "aks-azurelinux-v3-gen2",
        requirements: AMD64_GEN2,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "V3",
        distro: "aks-azurelinux-v3",
        requirements: AMD64_GEN1,
        sig_only: false,
    },
    CatalogEntry {
        image_definition: "V3gen2arm64",
        distro: "aks-azurelinux-v3-arm64-gen2",
        requirements: ARM64_GEN2,
        sig_only: true,
    },
];

const AZURE_LINUX_3_FIPS: &[CatalogEntry] = &[
    CatalogEntry {
        image_definition: "V3gen2fips",
        distro: "aks-azurelinux-v3-gen2-fips",
        requirements: AMD64_GEN2,
        sig_only: true,
    },
    CatalogEntry {
        image_definition: "V3fips",
        distro: "aks-azurelinux-v3-fips",
        requirements: AMD64_GEN1,
        sig_only: true,
    },
];

pub fn azure_linux_2_images(use_sig: bool, fips_mode: FipsMode) -> Vec<DefaultImageOutput> {
    match fips_mode {
        FipsMode::Fips => build_fips_catalog(&AZURE_LINUX_GALLERIES, AZURE_LINUX_2_FIPS, use_sig),
        FipsMode::Disabled => build_catalog(&AZURE_LINUX_GALLERIES, AZURE_LINUX_2, use_sig),
    }
}

pub fn azure_linux_3_images(use_sig: bool, fips_mode: FipsMode) -> Vec<DefaultImageOutput> {
    match fips_mode {
        FipsMode::Fips => build_fips_catalog(&AZURE_LINUX_GALLERIES, AZURE_LINUX_3_FIPS, use_sig),
        FipsMode::Disabled => build_catalog(&AZURE_LINUX_GALLERIES, AZURE_LINUX_3, use_sig),
    }
}
