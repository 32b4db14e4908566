//! Shared harness: a relaycast instance and recording backends on
//! ephemeral localhost ports.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use tokio::sync::{mpsc, oneshot};

use relaycast::proxy::forward::ForwardTimeouts;
use relaycast::server::{self, AppState, ForwardSettings, StatsSnapshot};

/// One request as seen by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub backend: &'static str,
    pub path: String,
    pub query: Option<String>,
    pub trace_id: Option<String>,
}

pub struct Relay {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    pub shutdown: oneshot::Sender<()>,
}

impl Relay {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.state.stats.snapshot()
    }

    /// Poll the counters until `done` holds or the deadline passes.
    pub async fn wait_for(&self, done: impl Fn(&StatsSnapshot) -> bool) -> StatsSnapshot {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let stats = self.stats();
            if done(&stats) || tokio::time::Instant::now() >= deadline {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

pub fn fast_settings() -> ForwardSettings {
    ForwardSettings {
        timeouts: ForwardTimeouts {
            connect: Duration::from_millis(300),
            read: Duration::from_millis(300),
        },
        max_in_flight: 64,
    }
}

pub async fn start_relay(backends: Vec<String>, settings: ForwardSettings) -> Relay {
    let state = Arc::new(AppState::new(backends, settings));
    let router = server::build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    Relay {
        addr,
        state,
        shutdown: shutdown_tx,
    }
}

/// A backend that records every request on `hits`, waits `delay`, then
/// answers with `status`.
pub async fn spawn_backend(
    name: &'static str,
    hits: mpsc::UnboundedSender<Hit>,
    delay: Duration,
    status: StatusCode,
) -> SocketAddr {
    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap| {
        let hits = hits.clone();
        async move {
            let _ = hits.send(Hit {
                backend: name,
                path: uri.path().to_string(),
                query: uri.query().map(String::from),
                trace_id: headers
                    .get("x-correlation-id")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
            });
            tokio::time::sleep(delay).await;
            (status, format!("hello from {name}"))
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub async fn ok_backend(name: &'static str, hits: mpsc::UnboundedSender<Hit>) -> SocketAddr {
    spawn_backend(name, hits, Duration::ZERO, StatusCode::OK).await
}

/// An address with nothing listening on it.
pub async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub async fn collect_hits(rx: &mut mpsc::UnboundedReceiver<Hit>, n: usize) -> Vec<Hit> {
    let mut hits = Vec::with_capacity(n);
    while hits.len() < n {
        let hit = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a backend hit")
            .expect("hit channel closed");
        hits.push(hit);
    }
    hits
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
