//! Presentation of a search report.
//!
//! - [`ResultTable`] renders the terminal table
//! - [`JsonWriter`] persists the flat result list
//! - [`MapRenderer`] persists located records as an HTML map

mod json;
mod map;
mod table;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use json::{read_results, JsonWriter};
pub use map::{map_points, LeafletMapRenderer, MapPoint, MapRenderer};
pub use table::ResultTable;

/// Errors writing or reading output artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode results: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turns a lookup value into a file stem.
///
/// Colons and path separators become underscores so a BSSID or an arbitrary
/// SSID always names a file inside the output directory.
pub fn output_stem(identifier: &str) -> String {
    let stem: String = identifier
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => format!("_{}", stem),
        _ => stem,
    }
}

/// Artifact path `<dir>/<stem>.<extension>` for a lookup value.
pub fn artifact_path(dir: &Path, identifier: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", output_stem(identifier), extension))
}

/// Creates parent directories and writes `contents` to `path`.
pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}
