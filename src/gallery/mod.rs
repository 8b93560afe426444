//! Latest image version lookup against the two gallery backends.
//!
//! The community gallery is asked once per image definition and reports
//! publish timestamps, so its lister picks the most recently published
//! version. The node image listing behind the shared gallery returns every
//! version in a region in one call without timestamps, so there the newest
//! version string wins ([`filtered_node_images`]). Both signals answer the
//! same question; each backend uses the one its API exposes.

pub mod community;
mod http;
pub mod shared;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use crate::error::Error;
use crate::imagefamily::{
    AKS_AZURE_LINUX_GALLERY_NAME, AKS_UBUNTU_GALLERY_NAME, DefaultImageOutput, GalleryRef,
};
use crate::version::is_newer_version;

pub use community::CommunityGalleryLister;
pub use http::build_client;
pub use shared::SharedGalleryLister;

/// Galleries whose node image versions are considered.
const SUPPORTED_GALLERIES: &[&str] = &[AKS_UBUNTU_GALLERY_NAME, AKS_AZURE_LINUX_GALLERY_NAME];

/// One version of one image definition, as listed by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeImageVersion {
    pub full_name: String,
    /// Gallery name, e.g. `AKSUbuntu`
    pub os: String,
    /// Image definition name
    pub sku: String,
    pub version: String,
}

/// Lists versions of one image definition in a community gallery.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommunityVersionLister: Send + Sync {
    /// Most recently published version, `None` when the definition has none.
    async fn latest_version(
        &self,
        location: &str,
        gallery_url: &str,
        image_definition: &str,
    ) -> Result<Option<String>, Error>;
}

/// Lists every node image version available to a subscription in a region.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SharedVersionLister: Send + Sync {
    async fn list(&self, location: &str, subscription: &str)
    -> Result<Vec<NodeImageVersion>, Error>;
}

/// Reduce raw records to the newest version per (gallery, SKU).
///
/// Records from galleries other than the AKS Ubuntu and Azure Linux ones are
/// dropped. Output keeps the order in which each pair was first seen.
pub fn filtered_node_images(records: Vec<NodeImageVersion>) -> Vec<NodeImageVersion> {
    let mut latest: Vec<NodeImageVersion> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        if !SUPPORTED_GALLERIES.contains(&record.os.as_str()) {
            continue;
        }

        let key = (record.os.clone(), record.sku.clone());
        match index.get(&key) {
            Some(&i) => {
                let current = &latest[i];
                if is_newer_version(&record.version, &current.version)
                    || (!is_well_formed(&current.version) && is_well_formed(&record.version))
                {
                    latest[i] = record;
                }
            }
            None => {
                index.insert(key, latest.len());
                latest.push(record);
            }
        }
    }

    latest
}

fn is_well_formed(version: &str) -> bool {
    version.split('.').all(|s| s.parse::<u64>().is_ok())
}

/// Resolves the latest version of each candidate image through one backend.
#[async_trait]
pub trait VersionLister: Send + Sync {
    /// One entry per candidate, in candidate order. `None` means the backend
    /// has no version of that image.
    async fn latest_versions(
        &self,
        location: &str,
        candidates: &[DefaultImageOutput],
    ) -> Result<Vec<Option<String>>, Error>;
}

/// Community gallery backend: one listing call per candidate.
pub struct CommunityGalleryVersions {
    lister: Arc<dyn CommunityVersionLister>,
}

impl CommunityGalleryVersions {
    pub fn new(lister: Arc<dyn CommunityVersionLister>) -> Self {
        Self { lister }
    }
}

#[async_trait]
impl VersionLister for CommunityGalleryVersions {
    async fn latest_versions(
        &self,
        location: &str,
        candidates: &[DefaultImageOutput],
    ) -> Result<Vec<Option<String>>, Error> {
        let lookups = candidates.iter().map(|candidate| async move {
            let GalleryRef::Community { public_gallery_url } = candidate.gallery() else {
                warn!(
                    image = candidate.image_definition(),
                    "candidate is not published to a community gallery, skipping"
                );
                return Ok(None);
            };

            self.lister
                .latest_version(location, public_gallery_url, candidate.image_definition())
                .await
                .map_err(|e| {
                    Error::community(location, public_gallery_url, candidate.image_definition(), e)
                })
        });

        try_join_all(lookups).await
    }
}

/// Shared gallery backend: one bulk listing shared by every candidate.
pub struct SharedGalleryVersions {
    lister: Arc<dyn SharedVersionLister>,
    subscription: String,
}

impl SharedGalleryVersions {
    pub fn new(lister: Arc<dyn SharedVersionLister>, subscription: impl Into<String>) -> Self {
        Self {
            lister,
            subscription: subscription.into(),
        }
    }
}

#[async_trait]
impl VersionLister for SharedGalleryVersions {
    async fn latest_versions(
        &self,
        location: &str,
        candidates: &[DefaultImageOutput],
    ) -> Result<Vec<Option<String>>, Error> {
        let records = self
            .lister
            .list(location, &self.subscription)
            .await
            .map_err(|e| Error::shared(location, &self.subscription, e))?;

        let latest = filtered_node_images(records);
        debug!(
            location,
            records = latest.len(),
            "listed shared gallery node image versions"
        );

        Ok(candidates
            .iter()
            .map(|candidate| {
                let gallery = match candidate.gallery() {
                    GalleryRef::Shared { gallery_name, .. } => Some(gallery_name),
                    GalleryRef::Community { .. } => None,
                };
                let found = latest
                    .iter()
                    .find(|r| {
                        r.sku == candidate.image_definition()
                            && gallery.is_none_or(|name| r.os == name)
                    })
                    .map(|r| r.version.clone());
                if found.is_none() {
                    debug!(
                        sku = candidate.image_definition(),
                        location, "no node image version for sku"
                    );
                }
                found
            })
            .collect())
    }
}
