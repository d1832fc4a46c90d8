//! Resolver configuration
//!
//! A working directory and a build-artifacts directory, plus the policies
//! that decide how strictly paths and artifact directories are treated.

use crate::ResolverError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How to treat unreadable or malformed entries while scanning artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// The first bad entry fails the whole scan
    #[default]
    Strict,
    /// Bad entries are logged and skipped
    SkipCorrupt,
}

/// How an absolute import path is checked against the working directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Containment {
    /// Raw string prefix match; `/proj2/A.sol` counts as inside `/proj`
    #[default]
    Prefix,
    /// Whole path components must match
    Component,
}

impl Containment {
    /// Check whether `path` lies under `root` according to this policy
    pub fn contains(&self, root: &Path, path: &str) -> bool {
        match self {
            Containment::Prefix => path.starts_with(root.to_string_lossy().as_ref()),
            Containment::Component => Path::new(path).starts_with(root),
        }
    }
}

/// Configuration shared by every resolution call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Project root; relative and package imports are interpreted against it
    pub working_directory: PathBuf,

    /// Flat directory holding one JSON artifact per compiled contract
    pub contracts_build_directory: PathBuf,

    #[serde(default)]
    pub scan_policy: ScanPolicy,

    #[serde(default)]
    pub containment: Containment,

    /// Cache a `sourcePath -> contractName` index per artifact directory
    #[serde(default)]
    pub use_artifact_index: bool,
}

impl ResolverConfig {
    /// Config file names looked up in the working directory
    pub const FILE_NAMES: [&'static str; 2] = [".resolver.yml", ".resolver.yaml"];

    /// Create a configuration with default policies
    pub fn new(
        working_directory: impl Into<PathBuf>,
        contracts_build_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            working_directory: working_directory.into(),
            contracts_build_directory: contracts_build_directory.into(),
            scan_policy: ScanPolicy::default(),
            containment: Containment::default(),
            use_artifact_index: false,
        }
    }

    /// Conventional layout: artifacts under `<root>/build/contracts`
    pub fn for_project(working_directory: impl AsRef<Path>) -> Self {
        let root = working_directory.as_ref();
        Self::new(root, root.join("build").join("contracts"))
    }

    pub fn with_scan_policy(mut self, policy: ScanPolicy) -> Self {
        self.scan_policy = policy;
        self
    }

    pub fn with_containment(mut self, containment: Containment) -> Self {
        self.containment = containment;
        self
    }

    pub fn with_artifact_index(mut self, enabled: bool) -> Self {
        self.use_artifact_index = enabled;
        self
    }

    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ResolverError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResolverError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            ResolverError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load configuration with fallback chain
    ///
    /// An explicit file must load. Otherwise the conventional file names are
    /// tried in the working directory, and the project layout defaults are
    /// used when none exists.
    pub fn load_from_defaults_and_file(
        working_directory: impl AsRef<Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ResolverError> {
        let root = working_directory.as_ref();

        if let Some(file) = config_file {
            return Self::load_from_file(file);
        }

        for name in Self::FILE_NAMES {
            let candidate = root.join(name);
            if candidate.exists() {
                tracing::debug!("Loading resolver config from {}", candidate.display());
                return Self::load_from_file(candidate);
            }
        }

        Ok(Self::for_project(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::new("/proj", "/proj/build/contracts");
        assert_eq!(config.scan_policy, ScanPolicy::Strict);
        assert_eq!(config.containment, Containment::Prefix);
        assert!(!config.use_artifact_index);
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("resolver.yml");
        std::fs::write(
            &file,
            "working_directory: /proj\n\
             contracts_build_directory: /proj/out\n\
             scan_policy: skip_corrupt\n\
             containment: component\n",
        )
        .unwrap();

        let config = ResolverConfig::load_from_file(&file).unwrap();
        assert_eq!(config.working_directory, PathBuf::from("/proj"));
        assert_eq!(config.contracts_build_directory, PathBuf::from("/proj/out"));
        assert_eq!(config.scan_policy, ScanPolicy::SkipCorrupt);
        assert_eq!(config.containment, Containment::Component);
        assert!(!config.use_artifact_index);
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("resolver.yml");
        std::fs::write(&file, "scan_policy: [").unwrap();

        let result = ResolverConfig::load_from_file(&file);
        assert!(matches!(result, Err(ResolverError::Config(_))));
    }

    #[test]
    fn test_fallback_chain() {
        let temp = TempDir::new().unwrap();

        let config = ResolverConfig::load_from_defaults_and_file(temp.path(), None).unwrap();
        assert_eq!(
            config.contracts_build_directory,
            temp.path().join("build").join("contracts")
        );

        std::fs::write(
            temp.path().join(".resolver.yml"),
            "working_directory: /elsewhere\ncontracts_build_directory: /elsewhere/artifacts\nuse_artifact_index: true\n",
        )
        .unwrap();

        let config = ResolverConfig::load_from_defaults_and_file(temp.path(), None).unwrap();
        assert_eq!(config.working_directory, PathBuf::from("/elsewhere"));
        assert!(config.use_artifact_index);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");

        let result = ResolverConfig::load_from_defaults_and_file(temp.path(), Some(&missing));
        assert!(result.is_err());
    }

    #[test]
    fn test_containment() {
        let root = Path::new("/proj");

        assert!(Containment::Prefix.contains(root, "/proj/contracts/A.sol"));
        assert!(Containment::Prefix.contains(root, "/proj2/contracts/A.sol"));

        assert!(Containment::Component.contains(root, "/proj/contracts/A.sol"));
        assert!(!Containment::Component.contains(root, "/proj2/contracts/A.sol"));
    }
}
