//! Filesystem import resolution for Solidity toolchains
//!
//! This crate answers two questions for a compiler pipeline:
//! - Given an import string found inside a source file, which file does it
//!   refer to and what are its contents?
//! - Given a logical path, where is the compiled artifact (or package JSON)
//!   it names?
//!
//! The second question may require recovering a contract name from a source
//! path by scanning a directory of previously built artifacts.

pub mod artifact;
pub mod config;
pub mod fs;
pub mod index;
pub mod path;
pub mod recovery;

pub use artifact::ArtifactHeader;
pub use config::{Containment, ResolverConfig, ScanPolicy};
pub use fs::FsSource;
pub use index::{ArtifactIndex, IndexCache};
pub use path::resolve_dependency_path;
pub use recovery::recover_contract_name;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during import resolution
///
/// Missing files, malformed JSON on lookup and out-of-root paths are not
/// errors; they resolve to `None`.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read artifact '{}': {source}", path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact '{}': {source}", path.display())]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;

/// A source file located for an import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// File contents
    pub body: String,
    /// The candidate path that produced the contents, exactly as tried
    pub path: String,
}

/// A place imports and artifacts can be resolved from
pub trait ImportSource {
    /// Resolve an import string appearing in `imported_from`
    fn resolve(
        &self,
        import_path: &str,
        imported_from: &str,
    ) -> ResolverResult<Option<ResolvedSource>>;

    /// Look up a compiled artifact or package JSON by logical path
    fn require(
        &self,
        import_path: &str,
        search_directory: Option<&Path>,
    ) -> ResolverResult<Option<serde_json::Value>>;

    /// Compute the absolute path of `dependency_path` imported by `import_path`
    fn resolve_dependency_path(&self, import_path: &str, dependency_path: &str) -> PathBuf {
        resolve_dependency_path(import_path, dependency_path)
    }
}

/// Try each source in order and return the first resolved import
pub fn resolve_first(
    sources: &[&dyn ImportSource],
    import_path: &str,
    imported_from: &str,
) -> ResolverResult<Option<ResolvedSource>> {
    for source in sources {
        if let Some(resolved) = source.resolve(import_path, imported_from)? {
            return Ok(Some(resolved));
        }
    }
    tracing::debug!(
        "No source resolved import '{}' from '{}'",
        import_path,
        imported_from
    );
    Ok(None)
}
