pub mod models;
pub use models::{NodeImageVersionsPage, RawNodeImageVersion};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::http::{get_json, management_url, next_page};
use super::{NodeImageVersion, SharedVersionLister};
use crate::error::Error;

/// Lists node image versions published to the AKS shared galleries.
pub struct SharedGalleryLister {
    client: Client,
    endpoint: Url,
    api_version: String,
    access_token: Option<String>,
}

impl SharedGalleryLister {
    pub fn new(
        client: Client,
        endpoint: Url,
        api_version: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_version: api_version.into(),
            access_token,
        }
    }
}

/// Convert one page, dropping records with missing fields.
pub fn page_versions(page: NodeImageVersionsPage) -> (Vec<NodeImageVersion>, usize, Option<String>) {
    let total = page.value.len();
    let versions: Vec<NodeImageVersion> = page
        .value
        .into_iter()
        .filter_map(RawNodeImageVersion::into_version)
        .collect();
    let skipped = total - versions.len();
    (versions, skipped, page.next_link)
}

#[async_trait]
impl SharedVersionLister for SharedGalleryLister {
    async fn list(
        &self,
        location: &str,
        subscription: &str,
    ) -> Result<Vec<NodeImageVersion>, Error> {
        let path = format!(
            "/subscriptions/{subscription}/providers/Microsoft.ContainerService/locations/{location}/nodeImageVersions"
        );
        let mut next = Some(management_url(&self.endpoint, &path, &self.api_version)?);
        let mut out = Vec::new();
        let mut skipped = 0usize;

        while let Some(url) = next {
            let page: NodeImageVersionsPage =
                get_json(&self.client, url, self.access_token.as_deref()).await?;
            let (versions, page_skipped, next_link) = page_versions(page);
            out.extend(versions);
            skipped += page_skipped;
            next = next_page(next_link)?;
        }

        debug!(
            location,
            versions = out.len(),
            skipped,
            "listed node image versions"
        );
        Ok(out)
    }
}
