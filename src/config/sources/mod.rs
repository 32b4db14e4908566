//! Config file formats.
//!
//! `.properties` is always available; YAML, JSON and TOML are gated by
//! feature flags. [`Format`] maps a file extension to a parser and a
//! renderer, and [`parse_config_str`] is the one entry point used by
//! both `run` and `validate`.

pub mod file_source;
pub mod properties;

use crate::config::model::Config;
use crate::error::RelaycastError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Properties,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "json")]
    Json,
    #[cfg(feature = "toml")]
    Toml,
}

impl Format {
    pub fn from_extension(ext: &str) -> Result<Self, RelaycastError> {
        match ext {
            "properties" => Ok(Self::Properties),

            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),

            #[cfg(feature = "json")]
            "json" => Ok(Self::Json),

            #[cfg(feature = "toml")]
            "toml" => Ok(Self::Toml),

            other => Err(RelaycastError::UnsupportedFormat(other.to_string())),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Properties => "properties",
            #[cfg(feature = "yaml")]
            Self::Yaml => "yaml",
            #[cfg(feature = "json")]
            Self::Json => "json",
            #[cfg(feature = "toml")]
            Self::Toml => "toml",
        }
    }

    /// Line-comment marker, if the format has one.
    #[must_use]
    pub const fn comment_marker(self) -> Option<&'static str> {
        match self {
            Self::Properties => Some("#"),
            #[cfg(feature = "yaml")]
            Self::Yaml => Some("#"),
            #[cfg(feature = "json")]
            Self::Json => None,
            #[cfg(feature = "toml")]
            Self::Toml => Some("#"),
        }
    }

    pub fn parse(self, content: &str) -> Result<Config, BoxError> {
        match self {
            Self::Properties => properties::from_str(content).map_err(BoxError::from),
            #[cfg(feature = "yaml")]
            Self::Yaml => serde_yml::from_str(content).map_err(BoxError::from),
            #[cfg(feature = "json")]
            Self::Json => serde_json::from_str(content).map_err(BoxError::from),
            #[cfg(feature = "toml")]
            Self::Toml => toml::from_str(content).map_err(BoxError::from),
        }
    }

    pub fn render(self, config: &Config) -> Result<String, RelaycastError> {
        let rendered: Result<String, BoxError> = match self {
            Self::Properties => Ok(properties::to_string(config)),
            #[cfg(feature = "yaml")]
            Self::Yaml => serde_yml::to_string(config).map_err(BoxError::from),
            #[cfg(feature = "json")]
            Self::Json => serde_json::to_string_pretty(config)
                .map(|s| s + "\n")
                .map_err(BoxError::from),
            #[cfg(feature = "toml")]
            Self::Toml => toml::to_string(config).map_err(BoxError::from),
        };
        rendered.map_err(|source| RelaycastError::Serialize { source })
    }
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, RelaycastError> {
    Format::from_extension(ext)?
        .parse(content)
        .map_err(|source| RelaycastError::ConfigParse {
            path: path_display.to_string(),
            source,
        })
}
