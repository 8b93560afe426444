//! Error types for node image resolution.
//!
//! Backend failures carry the identifiers of the call that failed so a
//! reconcile loop logging the error can tell which gallery and image
//! definition were involved.

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Listing versions of one image definition in a community gallery failed
    #[error("community gallery {gallery} image {image_definition} in {location}")]
    CommunityGallery {
        location: String,
        gallery: String,
        image_definition: String,
        #[source]
        source: Box<Error>,
    },

    /// Bulk listing of node image versions for a region failed
    #[error("shared gallery listing for subscription {subscription} in {location}")]
    SharedGallery {
        location: String,
        subscription: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("decoding response body")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Serialising the cache key components failed
    #[error("cache key for kubernetes {kubernetes_version}")]
    CacheKey {
        kubernetes_version: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("kubernetes version {version:?}: {message}")]
    KubernetesVersion { version: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn community(
        location: &str,
        gallery: &str,
        image_definition: &str,
        source: Error,
    ) -> Self {
        Error::CommunityGallery {
            location: location.to_string(),
            gallery: gallery.to_string(),
            image_definition: image_definition.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn shared(location: &str, subscription: &str, source: Error) -> Self {
        Error::SharedGallery {
            location: location.to_string(),
            subscription: subscription.to_string(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn gallery_context_does_not_repeat_the_cause() {
        let err = Error::community("eastus", "g", "i", Error::Url(url::ParseError::EmptyHost));
        let chain = format!("{:#}", anyhow::Error::new(err));

        assert_eq!(chain, "community gallery g image i in eastus: empty host");
        assert_eq!(chain.matches("empty host").count(), 1);
    }

    #[test]
    fn shared_context_names_subscription_once() {
        let err = Error::shared("westus2", "sub-1", Error::Url(url::ParseError::EmptyHost));
        let chain = format!("{:#}", anyhow::Error::new(err));

        assert_eq!(
            chain,
            "shared gallery listing for subscription sub-1 in westus2: empty host"
        );
    }
}
