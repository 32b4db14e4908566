//! `.properties` config source.
//!
//! Reads the flat `key=value` format used by JVM services: `#` and `!`
//! start comments, `=`, `:` or whitespace separate key from value, and a
//! trailing backslash continues the value on the next line. Only
//! `server.port` and `backend.servers` are consumed; other keys are
//! ignored.

use std::collections::HashMap;

use crate::config::model::{split_servers, Config};

pub const PORT_KEY: &str = "server.port";
pub const SERVERS_KEY: &str = "backend.servers";

#[derive(Debug, thiserror::Error)]
pub enum PropertiesError {
    #[error("missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("'{key}' must be an integer between 0 and 65535, got '{value}'")]
    InvalidPort {
        key: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Parse properties text into a key/value map. Later keys win.
#[must_use]
pub fn parse(content: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let mut pending = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if pending.is_empty() && (trimmed.is_empty() || trimmed.starts_with(['#', '!'])) {
            continue;
        }

        if let Some(continued) = trimmed.strip_suffix('\\') {
            pending.push_str(continued);
            continue;
        }
        pending.push_str(trimmed);

        let logical = std::mem::take(&mut pending);
        if let Some((key, value)) = split_entry(&logical) {
            entries.insert(key, value);
        }
    }

    // A dangling continuation on the last line still counts as an entry.
    if let Some((key, value)) = split_entry(&pending) {
        entries.insert(key, value);
    }

    entries
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    // The key ends at the first `=`, `:` or whitespace. Whitespace around
    // an explicit separator belongs to neither side.
    let key_end = line
        .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
        .unwrap_or(line.len());
    let rest = line[key_end..].trim_start();
    let value = rest.strip_prefix(['=', ':']).unwrap_or(rest).trim_start();
    Some((line[..key_end].to_string(), value.to_string()))
}

pub fn from_str(content: &str) -> Result<Config, PropertiesError> {
    let entries = parse(content);

    let raw_port = entries
        .get(PORT_KEY)
        .ok_or(PropertiesError::MissingKey(PORT_KEY))?;
    let port = raw_port
        .parse::<u16>()
        .map_err(|source| PropertiesError::InvalidPort {
            key: PORT_KEY,
            value: raw_port.clone(),
            source,
        })?;

    let servers = entries
        .get(SERVERS_KEY)
        .map(|raw| split_servers(raw))
        .ok_or(PropertiesError::MissingKey(SERVERS_KEY))?;

    Ok(Config::new(port, servers))
}

/// Render a config back into `.properties` text.
#[must_use]
pub fn to_string(config: &Config) -> String {
    format!(
        "{PORT_KEY}={}\n{SERVERS_KEY}={}\n",
        config.server.port,
        config.backends().join(",")
    )
}
