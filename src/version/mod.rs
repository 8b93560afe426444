use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use crate::error::{Error, Result};

/// Returns true when `v1` is strictly newer than `v2`.
///
/// Node image versions moved from `yy.mm.dd` to `yyyymm.dd.build`, so the
/// segments are compared numerically from left to right. A segment that is
/// not an integer makes the whole comparison false: a malformed version is
/// never preferred. With an equal common prefix the version with more
/// segments wins.
pub fn is_newer_version(v1: &str, v2: &str) -> bool {
    let (Some(left), Some(right)) = (numeric_segments(v1), numeric_segments(v2)) else {
        return false;
    };

    for (a, b) in left.iter().zip(right.iter()) {
        if a != b {
            return a > b;
        }
    }

    left.len() > right.len()
}

fn numeric_segments(version: &str) -> Option<Vec<u64>> {
    version.split('.').map(|s| s.parse::<u64>().ok()).collect()
}

fn kubernetes_version_regex() -> &'static Regex {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    VERSION_RE.get_or_init(|| {
        Regex::new(r"^v?(?P<major>\d+)\.(?P<minor>\d+)(?:\.(?P<patch>\d+))?(?:[-+].*)?$")
            .expect("invalid kubernetes version regex")
    })
}

/// A cluster's Kubernetes version as reported by the API server.
///
/// Keeps the string it was parsed from; that raw form is what takes part in
/// cache keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubernetesVersion {
    raw: String,
    version: Version,
}

impl KubernetesVersion {
    /// Accepts `v1.32.0`, `1.32`, `1.31.2-hotfix.20240101` and similar.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let caps = kubernetes_version_regex()
            .captures(trimmed)
            .ok_or_else(|| Error::KubernetesVersion {
                version: raw.to_string(),
                message: "expected <major>.<minor>[.<patch>]".to_string(),
            })?;

        let number = |name: &str| -> Result<u64> {
            caps.name(name)
                .map_or(Ok(0), |m| m.as_str().parse::<u64>())
                .map_err(|e| Error::KubernetesVersion {
                    version: raw.to_string(),
                    message: e.to_string(),
                })
        };

        Ok(Self {
            raw: trimmed.to_string(),
            version: Version::new(number("major")?, number("minor")?, number("patch")?),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn semver(&self) -> &Version {
        &self.version
    }

    /// True when this version is `major.minor` or later, patch ignored.
    pub fn at_least(&self, major: u64, minor: u64) -> bool {
        (self.version.major, self.version.minor) >= (major, minor)
    }
}

impl fmt::Display for KubernetesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{KubernetesVersion, is_newer_version};

    #[test]
    fn newer_date_based_version() {
        assert!(is_newer_version("202411.12.0", "202308.28.0"));
        assert!(!is_newer_version("202308.28.0", "202411.12.0"));
    }

    #[test]
    fn older_legacy_version() {
        assert!(!is_newer_version("2022.10.03", "2022.12.15"));
        assert!(is_newer_version("2022.12.15", "2022.10.03"));
    }

    #[test]
    fn new_scheme_beats_legacy_scheme() {
        assert!(is_newer_version("202411.12.0", "2022.12.15"));
        assert!(!is_newer_version("2022.12.15", "202411.12.0"));
    }

    #[test]
    fn equal_versions_are_not_newer() {
        for v in ["202411.12.0", "2022.10.03", "1", "0.0.0"] {
            assert!(!is_newer_version(v, v), "{v} should not be newer than itself");
        }
    }

    #[test]
    fn malformed_versions_are_never_newer() {
        assert!(!is_newer_version("2o2411.12.0", "202411.12.0"));
        assert!(!is_newer_version("202411.12.0", "2o2411.12.0"));
        assert!(!is_newer_version("", "1.0"));
        assert!(!is_newer_version("1..0", "1.0"));
        assert!(!is_newer_version("-1.0", "0.0"));
    }

    #[test]
    fn longer_version_wins_on_equal_prefix() {
        assert!(is_newer_version("202411.12.1", "202411.12"));
        assert!(!is_newer_version("202411.12", "202411.12.1"));
        assert!(is_newer_version("2.0", "2"));
        assert!(!is_newer_version("2", "2.0"));
        assert!(is_newer_version("3", "2.9.9"));
    }

    #[test]
    fn comparison_is_antisymmetric() {
        let samples = [
            "202411.12.0",
            "202308.28.0",
            "2022.10.03",
            "2022.12.15",
            "2o2411.12.0",
            "202411.12",
            "1",
            "",
        ];
        for a in samples {
            for b in samples {
                assert!(
                    !(is_newer_version(a, b) && is_newer_version(b, a)),
                    "{a} and {b} are both newer than each other"
                );
            }
        }
    }

    #[test]
    fn parse_kubernetes_versions() {
        let v = KubernetesVersion::parse("v1.32.0").expect("parse v1.32.0");
        assert_eq!(v.semver().minor, 32);
        assert_eq!(v.as_str(), "v1.32.0");
        assert!(v.at_least(1, 32));

        let v = KubernetesVersion::parse("1.31").expect("parse 1.31");
        assert_eq!(v.semver().patch, 0);
        assert!(!v.at_least(1, 32));

        let v = KubernetesVersion::parse("1.31.9-hotfix.20240101").expect("parse hotfix");
        assert_eq!(v.semver().patch, 9);
        assert!(v.at_least(1, 31));
    }

    #[test]
    fn reject_garbage_kubernetes_versions() {
        assert!(KubernetesVersion::parse("latest").is_err());
        assert!(KubernetesVersion::parse("").is_err());
        assert!(KubernetesVersion::parse("v1").is_err());
    }
}
