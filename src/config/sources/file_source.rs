//! Async file-based config source.
//!
//! [`FileSource`] pairs a path with the [`Format`] implied by its
//! extension, reads the file through Tokio, parses it and runs
//! [`validate`]. Configuration is read once at startup; there is no
//! change detection.

use std::path::{Path, PathBuf};

use super::Format;
use crate::config::model::Config;
use crate::config::validation::validate;
use crate::error::RelaycastError;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: Format,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RelaycastError> {
        let path = path.into();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format = Format::from_extension(ext)?;
        Ok(Self { path, format })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    async fn read_content(&self) -> Result<String, RelaycastError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelaycastError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                RelaycastError::Io(e)
            }
        })
    }

    pub async fn load(&self) -> Result<Config, RelaycastError> {
        self.load_with_port(None).await
    }

    /// Load the file, replace `server.port` with `port` when given, then
    /// validate the result.
    pub async fn load_with_port(&self, port: Option<u16>) -> Result<Config, RelaycastError> {
        let content = self.read_content().await?;

        let mut config =
            self.format
                .parse(&content)
                .map_err(|source| RelaycastError::ConfigParse {
                    path: self.path.display().to_string(),
                    source,
                })?;

        if let Some(port) = port {
            config.server.port = port;
        }

        if let Err(errors) = validate(&config) {
            return Err(RelaycastError::ConfigValidation { errors });
        }

        Ok(config)
    }
}
