//! Node image resolution for Azure nodes provisioned by a cluster autoscaler.
//!
//! Given a node class (image family, FIPS mode, gallery backend) and a
//! Kubernetes version, [`provider::NodeImageProvider`] returns the ordered
//! list of concrete gallery images a node may boot. The bootstrap layer then
//! takes the first one an instance type supports via
//! [`provider::select_image`].

pub mod cache;
pub mod config;
pub mod error;
pub mod gallery;
pub mod imagefamily;
pub mod provider;
pub mod requirements;
pub mod version;

pub use error::{Error, Result};
