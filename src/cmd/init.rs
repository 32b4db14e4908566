//! `relaycast init`: generate a starter configuration file.
//!
//! Renders a two-backend starter config in the requested format. Text
//! formats that allow comments get a short header; existing files are
//! never overwritten.

use crate::cli::InitArgs;
use crate::config::model::Config;
use crate::config::sources::Format;
use crate::error::RelaycastError;

const STARTER_PORT: u16 = 8080;
const STARTER_BACKENDS: &[&str] = &["http://localhost:8081", "http://localhost:8082"];

const HEADER: &str = "relaycast config\n\
    server.port      port to listen on (all interfaces)\n\
    backend.servers  every GET is copied to each of these base URLs\n";

#[must_use]
pub fn starter_config() -> Config {
    Config::new(
        STARTER_PORT,
        STARTER_BACKENDS.iter().map(|s| (*s).to_string()).collect(),
    )
}

/// Render the starter config, prefixed with a comment block where the
/// format supports one.
pub fn render_starter(format: Format) -> Result<String, RelaycastError> {
    let body = format.render(&starter_config())?;
    Ok(match format.comment_marker() {
        Some(marker) => {
            let header: String = HEADER
                .lines()
                .map(|line| format!("{marker} {line}\n"))
                .collect();
            format!("{header}\n{body}")
        }
        None => body,
    })
}

pub fn execute(args: &InitArgs) -> Result<(), RelaycastError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.format.default_path());

    if output.exists() {
        return Err(RelaycastError::FileExists { path: output });
    }

    let format = Format::from_extension(args.format.extension())?;
    let content = render_starter(format)?;

    std::fs::write(&output, content)?;
    println!("Created {}", output.display());
    Ok(())
}
