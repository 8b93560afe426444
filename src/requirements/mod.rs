use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CPU architecture an image is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" => Ok(Architecture::Amd64),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            other => Err(format!("unsupported architecture '{other}'")),
        }
    }
}

/// Azure VM hypervisor generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HyperVGeneration {
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2")]
    V2,
}

impl HyperVGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            HyperVGeneration::V1 => "1",
            HyperVGeneration::V2 => "2",
        }
    }
}

impl fmt::Display for HyperVGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HyperVGeneration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "v1" | "gen1" => Ok(HyperVGeneration::V1),
            "2" | "v2" | "gen2" => Ok(HyperVGeneration::V2),
            other => Err(format!("unsupported hypervisor generation '{other}'")),
        }
    }
}

/// Scheduling requirements an image places on the VM it boots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirements {
    architecture: Architecture,
    hyperv_generation: HyperVGeneration,
}

impl Requirements {
    pub const fn new(architecture: Architecture, hyperv_generation: HyperVGeneration) -> Self {
        Self {
            architecture,
            hyperv_generation,
        }
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn hyperv_generation(&self) -> HyperVGeneration {
        self.hyperv_generation
    }

    pub fn compatible_with(&self, capabilities: &InstanceCapabilities) -> bool {
        self.architecture == capabilities.architecture
            && capabilities
                .hyperv_generations
                .contains(&self.hyperv_generation)
    }
}

/// What an instance type actually supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceCapabilities {
    architecture: Architecture,
    hyperv_generations: Vec<HyperVGeneration>,
}

impl InstanceCapabilities {
    pub fn new(architecture: Architecture, hyperv_generations: Vec<HyperVGeneration>) -> Self {
        Self {
            architecture,
            hyperv_generations,
        }
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn hyperv_generations(&self) -> &[HyperVGeneration] {
        &self.hyperv_generations
    }
}

#[cfg(test)]
mod tests {
    use super::{Architecture, HyperVGeneration, InstanceCapabilities, Requirements};

    #[test]
    fn gen2_image_needs_gen2_support() {
        let req = Requirements::new(Architecture::Amd64, HyperVGeneration::V2);
        let gen1_only = InstanceCapabilities::new(Architecture::Amd64, vec![HyperVGeneration::V1]);
        let both = InstanceCapabilities::new(
            Architecture::Amd64,
            vec![HyperVGeneration::V1, HyperVGeneration::V2],
        );
        assert!(!req.compatible_with(&gen1_only));
        assert!(req.compatible_with(&both));
    }

    #[test]
    fn architecture_must_match() {
        let req = Requirements::new(Architecture::Arm64, HyperVGeneration::V2);
        let amd = InstanceCapabilities::new(Architecture::Amd64, vec![HyperVGeneration::V2]);
        assert!(!req.compatible_with(&amd));
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("x86_64".parse::<Architecture>(), Ok(Architecture::Amd64));
        assert_eq!("AArch64".parse::<Architecture>(), Ok(Architecture::Arm64));
        assert_eq!("Gen2".parse::<HyperVGeneration>(), Ok(HyperVGeneration::V2));
        assert!("s390x".parse::<Architecture>().is_err());
    }
}
