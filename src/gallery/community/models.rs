use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of `communityGalleries/{gallery}/images/{image}/versions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGalleryImageVersionList {
    #[serde(default)]
    pub value: Vec<CommunityGalleryImageVersion>,
    #[serde(default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommunityGalleryImageVersion {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Option<CommunityGalleryImageVersionProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGalleryImageVersionProperties {
    #[serde(default)]
    pub published_date: Option<DateTime<Utc>>,
}

impl CommunityGalleryImageVersion {
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.properties.as_ref().and_then(|p| p.published_date)
    }
}
