//! In-memory index of artifact directories
//!
//! Scanning every artifact on every lookup is fine for small builds. For
//! larger ones the `sourcePath -> contractName` mapping is built once per
//! directory and rebuilt when the directory's modification time changes.
//!
//! A directory that cannot be fully indexed under [`ScanPolicy::Strict`] is
//! not cached; lookups there go through the plain scan.
//!
//! A directory's mtime changes when entries are added, removed or renamed,
//! not when an existing artifact is rewritten in place. Call
//! [`IndexCache::invalidate`] after rewriting artifacts.

use crate::config::ScanPolicy;
use crate::path::fallback_contract_name;
use crate::recovery::{recover_contract_name, scan_artifacts};
use crate::ResolverResult;
use dashmap::DashMap;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Snapshot of one artifact directory
#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    /// Directory mtime when the snapshot was taken
    modified: Option<SystemTime>,
    names: HashMap<String, String>,
}

impl ArtifactIndex {
    /// Scan `search_directory` and record every artifact's source path
    ///
    /// When several artifacts record the same source path the one enumerated
    /// first is kept.
    pub fn build(search_directory: &Path, policy: ScanPolicy) -> ResolverResult<Self> {
        let modified = directory_mtime(search_directory);
        let mut names = HashMap::new();

        scan_artifacts::<(), _>(search_directory, policy, |_, header| {
            if let (Some(source_path), Some(contract_name)) =
                (header.source_path, header.contract_name)
            {
                names.entry(source_path).or_insert(contract_name);
            }
            ControlFlow::Continue(())
        })?;

        tracing::trace!(
            "Indexed {} artifacts in {}",
            names.len(),
            search_directory.display()
        );

        Ok(Self { modified, names })
    }

    /// Contract name recorded for `source_path`
    pub fn get(&self, source_path: &str) -> Option<&str> {
        self.names.get(source_path).map(String::as_str)
    }

    /// Whether the directory changed since this snapshot
    pub fn is_stale(&self, search_directory: &Path) -> bool {
        match (self.modified, directory_mtime(search_directory)) {
            (Some(recorded), Some(current)) => recorded != current,
            _ => true,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn directory_mtime(dir: &Path) -> Option<SystemTime> {
    std::fs::metadata(dir).and_then(|m| m.modified()).ok()
}

/// Artifact indexes keyed by directory
#[derive(Debug, Default)]
pub struct IndexCache {
    indexes: DashMap<PathBuf, ArtifactIndex>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover a contract name through the cached index for `search_directory`
    pub fn contract_name(
        &self,
        source_path: &str,
        search_directory: &Path,
        policy: ScanPolicy,
    ) -> ResolverResult<String> {
        if let Some(index) = self.indexes.get(search_directory) {
            if !index.is_stale(search_directory) {
                tracing::trace!("Artifact index hit for {}", search_directory.display());
                return Ok(index
                    .get(source_path)
                    .map(str::to_string)
                    .unwrap_or_else(|| fallback_contract_name(source_path)));
            }
        }

        tracing::trace!("Rebuilding artifact index for {}", search_directory.display());
        let index = match ArtifactIndex::build(search_directory, policy) {
            Ok(index) => index,
            Err(e) => {
                // The short-circuiting scan decides whether this lookup fails.
                tracing::debug!("Not indexing {}: {}", search_directory.display(), e);
                self.indexes.remove(search_directory);
                return recover_contract_name(source_path, search_directory, policy);
            }
        };
        let name = index
            .get(source_path)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_contract_name(source_path));
        self.indexes.insert(search_directory.to_path_buf(), index);

        Ok(name)
    }

    /// Drop the index for one directory
    pub fn invalidate(&self, search_directory: &Path) {
        self.indexes.remove(search_directory);
    }

    pub fn clear(&self) {
        self.indexes.clear();
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
