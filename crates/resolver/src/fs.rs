//! Filesystem import source
//!
//! Resolves imports against local files and compiled artifacts against a
//! directory of JSON build output.

use crate::artifact::read_json;
use crate::config::ResolverConfig;
use crate::index::IndexCache;
use crate::path::{
    artifact_file, has_json_extension, importer_relative_candidate, normalize_separators, package_json_path,
    relative_to_working_directory,
};
use crate::recovery::recover_contract_name;
use crate::{ImportSource, ResolvedSource, ResolverResult};
use serde_json::Value;
use std::path::Path;

/// Resolves imports and artifacts from the local filesystem
#[derive(Debug)]
pub struct FsSource {
    config: ResolverConfig,
    index: IndexCache,
}

impl FsSource {
    /// Create a filesystem source from a configuration
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            index: IndexCache::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Get the working directory
    pub fn working_directory(&self) -> &Path {
        &self.config.working_directory
    }

    /// Get the build-artifacts directory
    pub fn contracts_build_directory(&self) -> &Path {
        &self.config.contracts_build_directory
    }

    /// Look up an artifact by logical path
    ///
    /// `.json` paths are package files under `node_modules` (or relative to
    /// the working directory when written `./`). Anything else names a
    /// compiled contract, located through its recovered contract name in
    /// `search_directory` (the build directory when `None`).
    ///
    /// Missing, unreadable and malformed files yield `Ok(None)`. Only a scan
    /// of the artifact directory can fail.
    pub fn lookup(
        &self,
        import_path: &str,
        search_directory: Option<&Path>,
    ) -> ResolverResult<Option<Value>> {
        let search_directory =
            search_directory.unwrap_or(self.config.contracts_build_directory.as_path());
        let import_path = normalize_separators(import_path);

        if has_json_extension(&import_path) {
            return Ok(self.lookup_package_json(&import_path));
        }

        let source_path = if Path::new(&import_path).is_absolute() {
            if !self
                .config
                .containment
                .contains(&self.config.working_directory, &import_path)
            {
                tracing::debug!(
                    "Import {} is outside working directory {}",
                    import_path,
                    self.config.working_directory.display()
                );
                return Ok(None);
            }
            relative_to_working_directory(&self.config.working_directory, &import_path)
        } else {
            import_path
        };

        let contract_name = self.contract_name(&source_path, search_directory)?;
        let artifact_path = artifact_file(search_directory, &contract_name);
        tracing::debug!("Looking up {} at {}", source_path, artifact_path.display());

        Ok(read_json(&artifact_path))
    }

    /// Read a package JSON file; every failure is `None`
    pub fn lookup_package_json(&self, import_path: &str) -> Option<Value> {
        let path = package_json_path(&self.config.working_directory, import_path);
        tracing::debug!("Looking up package JSON {}", path.display());
        read_json(&path)
    }

    /// Recover the contract name compiled from `source_path`
    pub fn contract_name(
        &self,
        source_path: &str,
        search_directory: &Path,
    ) -> ResolverResult<String> {
        if self.config.use_artifact_index {
            self.index
                .contract_name(source_path, search_directory, self.config.scan_policy)
        } else {
            recover_contract_name(source_path, search_directory, self.config.scan_policy)
        }
    }

    /// Candidate paths for an import, in the order they are tried
    pub fn candidates(import_path: &str, imported_from: &str) -> [String; 2] {
        [
            import_path.to_string(),
            importer_relative_candidate(import_path, imported_from),
        ]
    }

    /// Find the file an import refers to
    ///
    /// Tries `import_path` as written, then relative to the directory of
    /// `imported_from`. The first non-empty candidate wins; invalid UTF-8 is
    /// decoded lossily. Read errors count as "not there".
    pub fn resolve_source(
        &self,
        import_path: &str,
        imported_from: &str,
    ) -> Option<ResolvedSource> {
        for candidate in Self::candidates(import_path, imported_from) {
            match std::fs::read(&candidate) {
                Ok(bytes) if !bytes.is_empty() => {
                    tracing::debug!("Resolved {} to {}", import_path, candidate);
                    return Some(ResolvedSource {
                        body: String::from_utf8_lossy(&bytes).into_owned(),
                        path: candidate,
                    });
                }
                Ok(_) => tracing::debug!("Candidate {} is empty", candidate),
                Err(e) => tracing::debug!("Candidate {} unreadable: {}", candidate, e),
            }
        }
        None
    }

    /// Async variant of [`FsSource::resolve_source`]
    ///
    /// Candidates are still read one after the other.
    pub async fn resolve_source_async(
        &self,
        import_path: &str,
        imported_from: &str,
    ) -> Option<ResolvedSource> {
        for candidate in Self::candidates(import_path, imported_from) {
            match tokio::fs::read(&candidate).await {
                Ok(bytes) if !bytes.is_empty() => {
                    tracing::debug!("Resolved {} to {}", import_path, candidate);
                    return Some(ResolvedSource {
                        body: String::from_utf8_lossy(&bytes).into_owned(),
                        path: candidate,
                    });
                }
                Ok(_) => tracing::debug!("Candidate {} is empty", candidate),
                Err(e) => tracing::debug!("Candidate {} unreadable: {}", candidate, e),
            }
        }
        None
    }

    /// Drop the cached artifact index for a directory
    pub fn invalidate_index(&self, search_directory: &Path) {
        self.index.invalidate(search_directory);
    }

    /// Drop every cached artifact index
    pub fn clear_index(&self) {
        self.index.clear();
    }
}

impl ImportSource for FsSource {
    fn resolve(
        &self,
        import_path: &str,
        imported_from: &str,
    ) -> ResolverResult<Option<ResolvedSource>> {
        Ok(self.resolve_source(import_path, imported_from))
    }

    fn require(
        &self,
        import_path: &str,
        search_directory: Option<&Path>,
    ) -> ResolverResult<Option<Value>> {
        self.lookup(import_path, search_directory)
    }
}
