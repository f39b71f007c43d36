//! JSON report artifact.

use std::path::Path;

use tracing::info;

use super::{write_file, OutputError};
use crate::record::LookupResult;

/// Writes the flat result list as pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWriter;

impl JsonWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, results: &[LookupResult]) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(results)?)
    }

    pub fn write(&self, path: &Path, results: &[LookupResult]) -> Result<(), OutputError> {
        let json = self.render(results)?;
        write_file(path, json.as_bytes())?;
        info!(path = %path.display(), entries = results.len(), "JSON report written");
        Ok(())
    }
}

/// Reads a report previously written by [`JsonWriter`].
pub fn read_results(path: &Path) -> Result<Vec<LookupResult>, OutputError> {
    let content = std::fs::read(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&content)?)
}
