pub mod models;
pub use models::{CommunityGalleryImageVersion, CommunityGalleryImageVersionList};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::CommunityVersionLister;
use super::http::{get_json, management_url, next_page};
use crate::error::Error;

/// Tracks the most recently published version seen across listing pages.
///
/// Versions without a publish date only win while nothing dated was seen.
/// Ties keep the first version observed.
#[derive(Debug, Default)]
pub struct LatestPublished {
    best: Option<(Option<DateTime<Utc>>, String)>,
}

impl LatestPublished {
    pub fn observe(&mut self, version: &CommunityGalleryImageVersion) {
        let Some(name) = version.name.as_deref() else {
            return;
        };
        let published = version.published_date();

        let newer = match &self.best {
            None => true,
            Some((best_published, _)) => published > *best_published,
        };
        if newer {
            self.best = Some((published, name.to_string()));
        }
    }

    pub fn into_version(self) -> Option<String> {
        self.best.map(|(_, name)| name)
    }
}

/// Reads image versions from Azure community galleries.
pub struct CommunityGalleryLister {
    client: Client,
    endpoint: Url,
    subscription: String,
    api_version: String,
    access_token: Option<String>,
}

impl CommunityGalleryLister {
    pub fn new(
        client: Client,
        endpoint: Url,
        subscription: impl Into<String>,
        api_version: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint,
            subscription: subscription.into(),
            api_version: api_version.into(),
            access_token,
        }
    }

    fn versions_url(
        &self,
        location: &str,
        gallery_url: &str,
        image_definition: &str,
    ) -> Result<Url, Error> {
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.Compute/locations/{location}/communityGalleries/{gallery_url}/images/{image_definition}/versions",
            self.subscription
        );
        management_url(&self.endpoint, &path, &self.api_version)
    }
}

#[async_trait]
impl CommunityVersionLister for CommunityGalleryLister {
    async fn latest_version(
        &self,
        location: &str,
        gallery_url: &str,
        image_definition: &str,
    ) -> Result<Option<String>, Error> {
        let mut latest = LatestPublished::default();
        let mut next = Some(self.versions_url(location, gallery_url, image_definition)?);
        let mut pages = 0usize;

        while let Some(url) = next {
            let page: CommunityGalleryImageVersionList =
                get_json(&self.client, url, self.access_token.as_deref()).await?;
            pages += 1;

            for version in &page.value {
                latest.observe(version);
            }
            next = next_page(page.next_link)?;
        }

        let version = latest.into_version();
        debug!(
            gallery = gallery_url,
            image = image_definition,
            pages,
            version = version.as_deref().unwrap_or("<none>"),
            "resolved latest community gallery image version"
        );
        Ok(version)
    }
}
