//! Contract name recovery
//!
//! Maps a source path to the contract name recorded by the compiler by
//! scanning a flat directory of artifacts. The first artifact, in directory
//! enumeration order, whose `sourcePath` equals the requested path wins.

use crate::artifact::ArtifactHeader;
use crate::config::ScanPolicy;
use crate::path::fallback_contract_name;
use crate::{ResolverError, ResolverResult};
use std::ops::ControlFlow;
use std::path::Path;

/// Visit the header of every artifact in `search_directory`
///
/// Stops early when `visit` breaks and returns the break value. Entries that
/// cannot be read or parsed fail the scan under [`ScanPolicy::Strict`] and
/// are skipped with a warning under [`ScanPolicy::SkipCorrupt`].
pub fn scan_artifacts<T, F>(
    search_directory: &Path,
    policy: ScanPolicy,
    mut visit: F,
) -> ResolverResult<Option<T>>
where
    F: FnMut(&Path, ArtifactHeader) -> ControlFlow<T>,
{
    for entry in std::fs::read_dir(search_directory)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                skip_or_fail(policy, ResolverError::Io(e))?;
                continue;
            }
        };

        let header = match ArtifactHeader::load(&path) {
            Ok(header) => header,
            Err(e) => {
                skip_or_fail(policy, e)?;
                continue;
            }
        };

        if let ControlFlow::Break(found) = visit(&path, header) {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

fn skip_or_fail(policy: ScanPolicy, error: ResolverError) -> ResolverResult<()> {
    match policy {
        ScanPolicy::Strict => Err(error),
        ScanPolicy::SkipCorrupt => {
            tracing::warn!("Skipping artifact: {}", error);
            Ok(())
        }
    }
}

/// Recover the contract name compiled from `source_path`
///
/// Falls back to the file name of `source_path` without its `.sol`
/// extension when no artifact matches.
pub fn recover_contract_name(
    source_path: &str,
    search_directory: &Path,
    policy: ScanPolicy,
) -> ResolverResult<String> {
    let found = scan_artifacts(search_directory, policy, |artifact, header| {
        match header.contract_name_for(source_path) {
            Some(name) => {
                tracing::debug!(
                    "Artifact {} records {} as {}",
                    artifact.display(),
                    source_path,
                    name
                );
                ControlFlow::Break(name.to_string())
            }
            None => ControlFlow::Continue(()),
        }
    })?;

    Ok(found.unwrap_or_else(|| {
        let fallback = fallback_contract_name(source_path);
        tracing::debug!(
            "No artifact for {} in {}, using {}",
            source_path,
            search_directory.display(),
            fallback
        );
        fallback
    }))
}
