//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the dispatcher
//! and counters), [`build_router`] for the catch-all Axum router,
//! [`build_http_client`] for the connection-pooled hyper client, and
//! [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::Router;
use bytes::Bytes;
use http_body_util::Empty;
use hyper_timeout::TimeoutConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower_http::trace::TraceLayer;

use crate::proxy;
use crate::proxy::dispatch::{Dispatcher, DEFAULT_MAX_IN_FLIGHT};
use crate::proxy::forward::{ForwardTimeouts, Forwarder};

/// Process-wide counters. Monotonic; never reset while running.
#[derive(Debug)]
pub struct Stats {
    pub received: AtomicU64,
    pub rejected: AtomicU64,
    pub scheduled: AtomicU64,
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            scheduled: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            scheduled: self.scheduled.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub rejected: u64,
    pub scheduled: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl StatsSnapshot {
    /// Forwards that reached a terminal state.
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

pub type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;
pub type HttpClient = Client<TimeoutConnector<HttpsConnector>, Empty<Bytes>>;

/// Knobs for the outbound side, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct ForwardSettings {
    pub timeouts: ForwardTimeouts,
    pub max_in_flight: u32,
}

impl Default for ForwardSettings {
    fn default() -> Self {
        Self {
            timeouts: ForwardTimeouts::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub stats: Arc<Stats>,
}

impl AppState {
    #[must_use]
    pub fn new(backends: Vec<String>, settings: ForwardSettings) -> Self {
        let stats = Arc::new(Stats::new());
        let client = build_http_client(settings.timeouts);
        let forwarder = Forwarder::new(client, settings.timeouts, Arc::clone(&stats));
        let dispatcher = Dispatcher::new(
            backends,
            forwarder,
            Arc::clone(&stats),
            settings.max_in_flight,
        );
        Self { dispatcher, stats }
    }
}

/// Build the outbound client. Both deadlines live on the connection:
/// `connect` bounds TCP plus TLS setup, `read` bounds every single socket
/// read, so a backend that keeps sending data is never cut off while one
/// that goes silent for `read` fails.
#[must_use]
pub fn build_http_client(timeouts: ForwardTimeouts) -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls cannot
    // auto-detect which one to use. Explicitly install `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    let mut connector = TimeoutConnector::new(https);
    connector.set_connect_timeout(Some(timeouts.connect));
    connector.set_read_timeout(Some(timeouts.read));

    // An idle pooled connection keeps polling for reads, so its read
    // deadline would already be running when it is handed a new request.
    // Every forward gets a fresh connection instead.
    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(connector)
}

/// Every path and method lands in the fallback; there are no reserved
/// routes, so `GET /health` is forwarded like any other request.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(proxy::forward_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn snapshot_reads_counters() {
        let stats = Stats::new();
        stats.received.fetch_add(2, Ordering::Relaxed);
        stats.succeeded.fetch_add(3, Ordering::Relaxed);
        stats.failed.fetch_add(1, Ordering::Relaxed);

        let snap = stats.snapshot();
        assert_eq!(snap.received, 2);
        assert_eq!(snap.completed(), 4);
        assert_eq!(snap.rejected, 0);
    }

    #[test]
    fn default_settings_match_documented_values() {
        let settings = ForwardSettings::default();
        assert_eq!(settings.timeouts.connect, Duration::from_millis(5000));
        assert_eq!(settings.timeouts.read, Duration::from_millis(5000));
        assert_eq!(settings.max_in_flight, 1024);
    }
}
