use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::error::{Error, Result};
use crate::version::KubernetesVersion;

/// Supplies the cluster's Kubernetes server version.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KubernetesVersionResolver: Send + Sync {
    async fn kubernetes_version(&self) -> Result<KubernetesVersion, Error>;
}

/// A version fixed at startup.
#[derive(Debug, Clone)]
pub struct StaticKubernetesVersion {
    version: KubernetesVersion,
}

impl StaticKubernetesVersion {
    pub fn new(version: KubernetesVersion) -> Self {
        Self { version }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self::new(KubernetesVersion::parse(raw)?))
    }
}

#[async_trait]
impl KubernetesVersionResolver for StaticKubernetesVersion {
    async fn kubernetes_version(&self) -> Result<KubernetesVersion, Error> {
        Ok(self.version.clone())
    }
}
