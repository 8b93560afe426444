//! Node image provider.
//!
//! Turns a node class into the ordered list of concrete images its nodes may
//! boot: pick the family, pick the backend, look up the latest version of
//! every candidate and build full image IDs. Results are memoized in an
//! [`ImageCache`] owned by the provider.

mod kubernetes;
mod models;

pub use kubernetes::{KubernetesVersionResolver, StaticKubernetesVersion};
pub use models::{NodeClass, NodeImage, select_image};

#[cfg(test)]
pub use kubernetes::MockKubernetesVersionResolver;

use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{ImageCache, cache_key};
use crate::error::Result;
use crate::gallery::{
    CommunityGalleryVersions, CommunityVersionLister, SharedGalleryVersions, SharedVersionLister,
    VersionLister,
};
use crate::imagefamily::ImageFamily;
use crate::version::KubernetesVersion;

pub struct NodeImageProvider {
    location: String,
    sig_subscription: String,
    community: Arc<dyn VersionLister>,
    shared: Arc<dyn VersionLister>,
    kubernetes_version: Arc<dyn KubernetesVersionResolver>,
    cache: Arc<ImageCache>,
}

impl NodeImageProvider {
    /// `subscription` is used for node image listings, `sig_subscription`
    /// is the subscription that owns the AKS shared galleries.
    pub fn new(
        location: impl Into<String>,
        subscription: impl Into<String>,
        sig_subscription: impl Into<String>,
        community: Arc<dyn CommunityVersionLister>,
        shared: Arc<dyn SharedVersionLister>,
        kubernetes_version: Arc<dyn KubernetesVersionResolver>,
        cache: Arc<ImageCache>,
    ) -> Self {
        Self::with_backends(
            location,
            sig_subscription,
            Arc::new(CommunityGalleryVersions::new(community)),
            Arc::new(SharedGalleryVersions::new(shared, subscription)),
            kubernetes_version,
            cache,
        )
    }

    pub fn with_backends(
        location: impl Into<String>,
        sig_subscription: impl Into<String>,
        community: Arc<dyn VersionLister>,
        shared: Arc<dyn VersionLister>,
        kubernetes_version: Arc<dyn KubernetesVersionResolver>,
        cache: Arc<ImageCache>,
    ) -> Self {
        Self {
            location: location.into(),
            sig_subscription: sig_subscription.into(),
            community,
            shared,
            kubernetes_version,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Images for `node_class`, highest priority first.
    ///
    /// Uses the node class's Kubernetes version when set, the cluster's
    /// otherwise.
    pub async fn list(&self, node_class: &NodeClass) -> Result<Vec<NodeImage>> {
        let version = match node_class.kubernetes_version.as_deref() {
            Some(raw) => KubernetesVersion::parse(raw)?,
            None => self.kubernetes_version.kubernetes_version().await?,
        };
        self.list_for_version(node_class, &version).await
    }

    pub async fn list_for_version(
        &self,
        node_class: &NodeClass,
        kubernetes_version: &KubernetesVersion,
    ) -> Result<Vec<NodeImage>> {
        let use_sig = node_class.use_sig;
        let family = ImageFamily::resolve(node_class.image_family.as_deref(), kubernetes_version);
        let supported = family.default_images(use_sig, node_class.fips_mode);
        if supported.is_empty() {
            debug!(
                family = family.name(),
                fips_mode = ?node_class.fips_mode,
                use_sig,
                "image family has no candidate images"
            );
            return Ok(Vec::new());
        }

        let key = cache_key(&supported, kubernetes_version.as_str(), use_sig)?;
        if let Some(images) = self.cache.get(&key) {
            debug!(family = family.name(), %kubernetes_version, use_sig, "node image cache hit");
            return Ok(images);
        }

        let backend = if use_sig { &self.shared } else { &self.community };
        let versions = backend.latest_versions(&self.location, &supported).await?;

        let images: Vec<NodeImage> = supported
            .iter()
            .zip(versions)
            .filter_map(|(candidate, version)| match version {
                Some(version) => Some(NodeImage::new(
                    candidate.image_id(&self.sig_subscription, &version),
                    candidate.requirements(),
                )),
                None => {
                    debug!(
                        image = candidate.image_definition(),
                        distro = candidate.distro(),
                        "no version found for candidate image, skipping"
                    );
                    None
                }
            })
            .collect();

        info!(
            family = family.name(),
            %kubernetes_version,
            use_sig,
            images = images.len(),
            "resolved node images"
        );
        self.cache.insert(key, images.clone());
        Ok(images)
    }
}
