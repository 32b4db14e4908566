//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, init), and their argument structs. Every
//! `run` flag has an environment variable equivalent for container
//! deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "relaycast",
    version,
    about = "Fire-and-forget GET broadcast proxy",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        relaycast init                         Create ./application.properties\n  \
        relaycast run                          Start with the auto-detected config\n  \
        relaycast run -c relaycast.yaml        Start with a specific config"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Validate a config file without starting
    Validate(ValidateArgs),

    /// Generate a starter config file
    Init(InitArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        relaycast run                                     Auto-detect config\n  \
        relaycast run -c application.properties           Specific config file\n  \
        relaycast run -p 9000 --pretty                    Override port, local dev\n  \
        relaycast run --read-timeout-ms 2000              Tighter backend budget")]
pub struct RunArgs {
    /// Config file path (.properties, .yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Listen port (overrides `server.port`)
    #[arg(short, long, env = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Backend connect timeout in milliseconds
    #[arg(
        long,
        env = "CONNECT_TIMEOUT_MS",
        default_value_t = 5000,
        help_heading = "Tuning"
    )]
    pub connect_timeout_ms: u64,

    /// Backend read timeout in milliseconds
    #[arg(
        long,
        env = "READ_TIMEOUT_MS",
        default_value_t = 5000,
        help_heading = "Tuning"
    )]
    pub read_timeout_ms: u64,

    /// Maximum concurrent outbound forwards; excess forwards queue
    #[arg(
        long,
        env = "MAX_IN_FLIGHT",
        default_value_t = 1024,
        value_parser = clap::value_parser!(u32).range(1..),
        help_heading = "Tuning"
    )]
    pub max_in_flight: u32,

    /// Seconds to wait for in-flight forwards on shutdown
    #[arg(
        long,
        env = "DRAIN_TIMEOUT_SECS",
        default_value_t = 10,
        help_heading = "Tuning"
    )]
    pub drain_timeout_secs: u64,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "application.properties")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        relaycast init                             ./application.properties\n  \
        relaycast init -f yaml                     ./relaycast.yaml\n  \
        relaycast init -f toml -o shadow.toml      Custom path")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "properties")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Properties,
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    #[must_use]
    pub fn default_path(&self) -> PathBuf {
        match self {
            Self::Properties => PathBuf::from("application.properties"),
            other => PathBuf::from(format!("relaycast.{}", other.extension())),
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
