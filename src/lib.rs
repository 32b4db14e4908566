//! relaycast is a fire-and-forget HTTP GET broadcast proxy.
//!
//! Every inbound `GET` is acknowledged immediately and copied, with its
//! query string, to each configured backend concurrently. Backend
//! responses are logged and counted but never returned to the caller,
//! which makes relaycast suited to shadow traffic and fan-out
//! notification rather than request/response proxying.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, init).
//! - [`config`] -- Config file loading (`.properties`, YAML, JSON, TOML)
//!   and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- The request path: trace ids, the fan-out dispatcher, and
//!   the per-backend forwarder.
//! - [`server`] -- Axum router, shared application state, HTTP client, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file formats |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod server;
