//! TTL cache of resolved node image lists.
//!
//! Entries are keyed by [`cache_key`] and expire a fixed time after they are
//! written. Reads and writes go through a `DashMap`, so any number of
//! reconcilers can share one cache without locking. Two callers missing on
//! the same key both resolve and both write; the last write wins.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::{Error, Result};
use crate::imagefamily::DefaultImageOutput;
use crate::provider::NodeImage;

/// Resolved images stay valid for three days.
pub const DEFAULT_IMAGE_EXPIRATION: Duration = Duration::from_secs(3 * 24 * 60 * 60);
/// Expired entries are swept hourly.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Hash of everything that decides which images a listing returns.
///
/// `supported` is hashed as a set: reordering a catalog without changing its
/// members keeps the key, while a different family, FIPS mode, backend or
/// Kubernetes version changes the member set or the other inputs.
pub fn cache_key(
    supported: &[DefaultImageOutput],
    kubernetes_version: &str,
    use_sig: bool,
) -> Result<String> {
    let mut members = supported
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| Error::CacheKey {
            kubernetes_version: kubernetes_version.to_string(),
            source,
        })?;
    members.sort();
    members.dedup();

    let mut hasher = Sha256::new();
    hasher.update((members.len() as u64).to_le_bytes());
    for member in &members {
        write_field(&mut hasher, member.as_bytes());
    }
    write_field(&mut hasher, kubernetes_version.as_bytes());
    hasher.update([u8::from(use_sig)]);

    Ok(hex::encode(hasher.finalize()))
}

fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    images: Vec<NodeImage>,
    expires_at: Instant,
}

/// Concurrent cache of image lists with a fixed time to live.
#[derive(Debug)]
pub struct ImageCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXPIRATION)
    }
}

impl ImageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Unexpired images for `key`. An expired entry is removed on the way.
    pub fn get(&self, key: &str) -> Option<Vec<NodeImage>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.images.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        None
    }

    pub fn insert(&self, key: String, images: Vec<NodeImage>) {
        let expires_at = Instant::now() + self.ttl;
        self.entries.insert(key, CacheEntry { images, expires_at });
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn reset(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sweep expired entries every `interval` until the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    debug!("image cache dropped, stopping sweeper");
                    return;
                };
                let removed = cache.sweep();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "swept expired image cache entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagefamily::ImageFamily;
    use crate::imagefamily::FipsMode;
    use crate::requirements::{Architecture, HyperVGeneration, Requirements};

    fn images(id: &str) -> Vec<NodeImage> {
        vec![NodeImage::new(
            id.to_string(),
            Requirements::new(Architecture::Amd64, HyperVGeneration::V2),
        )]
    }

    #[test]
    fn key_ignores_catalog_order() {
        let mut supported = ImageFamily::Ubuntu2204.default_images(false, FipsMode::Disabled);
        let forward = cache_key(&supported, "1.31.0", false).expect("key");
        supported.reverse();
        let reversed = cache_key(&supported, "1.31.0", false).expect("key");
        assert_eq!(forward, reversed);
    }

    #[test]
    fn key_changes_with_inputs() {
        let ubuntu = ImageFamily::Ubuntu2204.default_images(true, FipsMode::Disabled);
        let ubuntu_fips = ImageFamily::Ubuntu2204.default_images(true, FipsMode::Fips);
        let ubuntu_cig = ImageFamily::Ubuntu2204.default_images(false, FipsMode::Disabled);
        let azure_linux = ImageFamily::AzureLinux.default_images(true, FipsMode::Disabled);

        let base = cache_key(&ubuntu, "1.31.0", true).expect("key");
        assert_ne!(base, cache_key(&ubuntu, "1.32.0", true).expect("key"));
        assert_ne!(base, cache_key(&ubuntu, "1.31.0", false).expect("key"));
        assert_ne!(base, cache_key(&ubuntu_fips, "1.31.0", true).expect("key"));
        assert_ne!(base, cache_key(&ubuntu_cig, "1.31.0", true).expect("key"));
        assert_ne!(base, cache_key(&azure_linux, "1.31.0", true).expect("key"));
        assert_eq!(base, cache_key(&ubuntu, "1.31.0", true).expect("key"));
    }

    #[test]
    fn empty_supported_set_still_has_a_key() {
        let a = cache_key(&[], "1.31.0", false).expect("key");
        let b = cache_key(&[], "1.31.0", true).expect("key");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ImageCache::new(Duration::from_secs(60));
        cache.insert("k".to_string(), images("/a"));
        assert_eq!(cache.get("k"), Some(images("/a")));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get("k").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_expired() {
        let cache = ImageCache::new(Duration::from_secs(60));
        cache.insert("old".to_string(), images("/old"));
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.insert("new".to_string(), images("/new"));
        tokio::time::advance(Duration::from_secs(31)).await;

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("new").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task_clears_expired_entries() {
        let cache = Arc::new(ImageCache::new(Duration::from_secs(10)));
        let handle = cache.spawn_sweeper(Duration::from_secs(5));
        cache.insert("k".to_string(), images("/a"));

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(cache.is_empty());

        drop(cache);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_access_needs_no_external_locking() {
        let cache = Arc::new(ImageCache::default());

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    let key = format!("key-{}", i % 4);
                    cache.insert(key.clone(), images(&format!("/{key}")));
                    let found = cache.get(&key);
                    cache.sweep();
                    found
                })
            })
            .collect();

        for task in tasks {
            let found = task.await.expect("task completes").expect("entry present");
            assert_eq!(found.len(), 1);
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get("key-2"), Some(images("/key-2")));
    }

    #[test]
    fn reset_clears_everything() {
        let cache = ImageCache::default();
        cache.insert("a".to_string(), images("/a"));
        cache.insert("b".to_string(), images("/b"));
        cache.reset();
        assert!(cache.is_empty());
    }
}
