//! Serde data structures for the relaycast configuration file.
//!
//! The file carries exactly two settings: `server.port` and
//! `backend.servers`. Structured formats accept the backend list either
//! as a sequence or as a single comma-separated string, matching the
//! `.properties` convention.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(deserialize_with = "deserialize_servers")]
    pub servers: Vec<String>,
}

impl Config {
    #[must_use]
    pub fn new(port: u16, servers: Vec<String>) -> Self {
        Self {
            server: ServerConfig { port },
            backend: BackendConfig { servers },
        }
    }

    #[must_use]
    pub fn backends(&self) -> &[String] {
        &self.backend.servers
    }
}

/// Split a comma-separated backend list, trimming entries and dropping
/// empty ones.
#[must_use]
pub fn split_servers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServerList {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_servers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let servers = match ServerList::deserialize(deserializer)? {
        ServerList::Csv(raw) => split_servers(&raw),
        ServerList::List(list) => list
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    };
    Ok(servers)
}
