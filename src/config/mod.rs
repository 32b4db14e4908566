//! Configuration loading and validation.
//!
//! The configuration is read once, before the listener is bound, and is
//! immutable afterwards. [`resolve_source`] picks the file (explicit
//! path or auto-detected in the working directory) and
//! [`sources::file_source::FileSource`] loads and validates it.

pub mod model;
pub mod sources;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::RelaycastError;
use sources::file_source::FileSource;

/// Files tried, in order, when no `--config` is given.
pub const CANDIDATES: &[&str] = &[
    "application.properties",
    "relaycast.yaml",
    "relaycast.yml",
    "relaycast.json",
    "relaycast.toml",
];

pub async fn resolve_source(explicit: Option<&Path>) -> Result<FileSource, RelaycastError> {
    if let Some(path) = explicit {
        return FileSource::new(path);
    }

    for name in CANDIDATES {
        let path = PathBuf::from(name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        match FileSource::new(&path) {
            Ok(source) => {
                tracing::info!(path = %path.display(), "auto-detected config file");
                return Ok(source);
            }
            // Present on disk but its format feature is compiled out.
            Err(RelaycastError::UnsupportedFormat(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(RelaycastError::NoConfigSource {
        hint: "Provide --config <file> or create ./application.properties.\n  \
               Run 'relaycast init' to create a config file."
            .into(),
    })
}
