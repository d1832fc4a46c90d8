//! Build artifact records
//!
//! Artifacts are JSON objects written by the compiler. Only `sourcePath` and
//! `contractName` are interpreted here; everything else is returned to the
//! caller untouched.

use crate::ResolverError;
use serde_json::Value;
use std::path::Path;

/// The part of an artifact needed to map a source file to a contract name
///
/// Built from a raw [`Value`] rather than deserialized: an artifact that is
/// not an object, or whose fields are not strings, must fail to match
/// instead of failing the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub source_path: Option<String>,
    pub contract_name: Option<String>,
}

impl ArtifactHeader {
    /// Read and parse the header of one artifact file
    pub fn load(path: &Path) -> Result<Self, ResolverError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            ResolverError::ArtifactRead {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|source| ResolverError::ArtifactParse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_value(&value))
    }

    /// Extract the header from any JSON value
    ///
    /// Non-object values and non-string fields yield empty fields.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            source_path: field("sourcePath"),
            contract_name: field("contractName"),
        }
    }

    /// Contract name when this artifact was compiled from `source_path`
    pub fn contract_name_for(&self, source_path: &str) -> Option<&str> {
        match (&self.source_path, &self.contract_name) {
            (Some(recorded), Some(name)) if recorded == source_path => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Read a JSON file, collapsing every failure to `None`
pub fn read_json(path: &Path) -> Option<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Could not parse {}: {}", path.display(), e);
            None
        }
    }
}
