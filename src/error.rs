//! Unified error types for relaycast.
//!
//! [`RelaycastError`] covers everything that can stop a subcommand:
//! configuration faults, bind failures, I/O. [`DeliveryError`] is the
//! failure reason of a single outbound forward; it never leaves the
//! forwarding task and only ends up in a log record.

use std::path::PathBuf;
use std::time::Duration;

use hyper::StatusCode;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelaycastError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Config serialization failed: {source}")]
    Serialize {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Why a single forward did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid target URL: {0}")]
    InvalidUrl(#[from] http::uri::InvalidUri),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("no connection within {}ms", .0.as_millis())]
    ConnectTimeout(Duration),

    #[error("backend sent nothing for {}ms", .0.as_millis())]
    ReadTimeout(Duration),

    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("backend answered with status {0}")]
    UnexpectedStatus(StatusCode),

    #[error("dispatcher is shut down")]
    DispatcherClosed,
}

impl DeliveryError {
    /// Render the error together with its whole `source()` chain.
    ///
    /// hyper's client errors are terse at the top level ("client error
    /// (Connect)"); the useful detail lives further down the chain.
    #[must_use]
    pub fn reason(&self) -> String {
        let mut reason = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if !reason.ends_with(&text) {
                reason.push_str(": ");
                reason.push_str(&text);
            }
            source = err.source();
        }
        reason
    }
}
