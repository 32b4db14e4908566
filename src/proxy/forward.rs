//! Execution of a single outbound forward.
//!
//! [`Forwarder::forward`] issues one `GET` to one backend. The connect and
//! read deadlines are enforced on the connection itself (see
//! [`build_http_client`](crate::server::build_http_client)); a read
//! deadline elapses only when the backend sends nothing for that long. Every
//! outcome ends as exactly one log record and one counter bump; nothing
//! is returned to the caller that scheduled the forward.

use std::error::Error;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, Uri};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::StatusCode;

use super::trace::{TraceId, TRACE_HEADER};
use crate::error::DeliveryError;
use crate::server::{HttpClient, Stats};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(5000);

const VIA: &str = "1.1 relaycast";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for ForwardTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// One backend call for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTask {
    pub trace_id: TraceId,
    pub url: String,
}

#[derive(Debug)]
pub struct ForwardOutcome {
    pub trace_id: TraceId,
    pub url: String,
    pub status: Option<StatusCode>,
    pub body: Option<Bytes>,
    pub latency_ms: u64,
    pub error: Option<DeliveryError>,
}

impl ForwardOutcome {
    #[must_use]
    pub fn failed(task: ForwardTask, error: DeliveryError, latency_ms: u64) -> Self {
        Self {
            trace_id: task.trace_id,
            url: task.url,
            status: None,
            body: None,
            latency_ms,
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone)]
pub struct Forwarder {
    client: HttpClient,
    timeouts: ForwardTimeouts,
    stats: Arc<Stats>,
}

impl Forwarder {
    #[must_use]
    pub fn new(client: HttpClient, timeouts: ForwardTimeouts, stats: Arc<Stats>) -> Self {
        Self {
            client,
            timeouts,
            stats,
        }
    }

    #[must_use]
    pub const fn timeouts(&self) -> ForwardTimeouts {
        self.timeouts
    }

    #[allow(clippy::cast_possible_truncation)]
    pub async fn forward(&self, task: ForwardTask) -> ForwardOutcome {
        tracing::info!(
            trace_id = %task.trace_id,
            url = %task.url,
            "forwarding request"
        );

        let start = Instant::now();
        let result = self.deliver(&task).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok((status, body)) if status.is_success() => ForwardOutcome {
                trace_id: task.trace_id,
                url: task.url,
                status: Some(status),
                body: Some(body),
                latency_ms,
                error: None,
            },
            Ok((status, body)) => ForwardOutcome {
                trace_id: task.trace_id,
                url: task.url,
                status: Some(status),
                body: Some(body),
                latency_ms,
                error: Some(DeliveryError::UnexpectedStatus(status)),
            },
            Err(e) => ForwardOutcome::failed(task, e, latency_ms),
        };

        self.report(&outcome);
        outcome
    }

    async fn deliver(&self, task: &ForwardTask) -> Result<(StatusCode, Bytes), DeliveryError> {
        let uri: Uri = task.url.parse()?;

        let req = hyper::Request::get(uri)
            .header(TRACE_HEADER, task.trace_id.to_string())
            .header(header::VIA, VIA)
            .body(Empty::<Bytes>::new())?;

        // Deadlines are enforced by the connector; here they are only
        // told apart from other transport failures.
        let response = self.client.request(req).await.map_err(|e| {
            if !timed_out(&e) {
                DeliveryError::Transport(e)
            } else if e.is_connect() {
                DeliveryError::ConnectTimeout(self.timeouts.connect)
            } else {
                DeliveryError::ReadTimeout(self.timeouts.read)
            }
        })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| {
                if timed_out(&e) {
                    DeliveryError::ReadTimeout(self.timeouts.read)
                } else {
                    DeliveryError::Body(e)
                }
            })?
            .to_bytes();

        Ok((status, body))
    }

    /// Emit the terminal log record for an outcome and count it.
    pub fn report(&self, outcome: &ForwardOutcome) {
        let body = outcome
            .body
            .as_deref()
            .map(String::from_utf8_lossy)
            .unwrap_or_default();

        match (&outcome.error, outcome.status) {
            (None, status) => {
                self.stats.succeeded.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    trace_id = %outcome.trace_id,
                    url = %outcome.url,
                    status = status.map_or(0, |s| s.as_u16()),
                    body = %body,
                    latency_ms = outcome.latency_ms,
                    "backend responded"
                );
            }
            (Some(err), Some(status)) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    trace_id = %outcome.trace_id,
                    url = %outcome.url,
                    status = status.as_u16(),
                    body = %body,
                    error = %err.reason(),
                    latency_ms = outcome.latency_ms,
                    "backend delivery failed"
                );
            }
            (Some(err), None) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    trace_id = %outcome.trace_id,
                    url = %outcome.url,
                    error = %err.reason(),
                    latency_ms = outcome.latency_ms,
                    "backend delivery failed"
                );
            }
        }
    }
}

/// Whether an I/O timeout sits anywhere in the error's source chain.
fn timed_out(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
        {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_http_client;

    fn forwarder(read: Duration) -> (Forwarder, Arc<Stats>) {
        let stats = Arc::new(Stats::new());
        let timeouts = ForwardTimeouts {
            connect: Duration::from_millis(500),
            read,
        };
        let client = build_http_client(timeouts);
        (Forwarder::new(client, timeouts, Arc::clone(&stats)), stats)
    }

    fn task(url: &str) -> ForwardTask {
        ForwardTask {
            trace_id: TraceId::generate(),
            url: url.into(),
        }
    }

    #[test]
    fn default_timeouts_are_five_seconds() {
        let timeouts = ForwardTimeouts::default();
        assert_eq!(timeouts.connect, Duration::from_millis(5000));
        assert_eq!(timeouts.read, Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn malformed_url_is_a_contained_failure() {
        let (forwarder, stats) = forwarder(Duration::from_millis(500));
        let outcome = forwarder.forward(task("not a url")).await;

        assert!(!outcome.is_success());
        assert!(matches!(outcome.error, Some(DeliveryError::InvalidUrl(_))));
        assert_eq!(outcome.status, None);
        assert_eq!(stats.failed.load(Ordering::Relaxed), 1);
        assert_eq!(stats.succeeded.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (forwarder, stats) = forwarder(Duration::from_millis(500));
        let t = task(&format!("http://{addr}"));
        let trace_id = t.trace_id;
        let outcome = forwarder.forward(t).await;

        assert_eq!(outcome.trace_id, trace_id);
        assert!(matches!(outcome.error, Some(DeliveryError::Transport(_))));
        assert_eq!(stats.failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn failed_outcome_keeps_task_identity() {
        let t = task("http://a.test?x=1");
        let trace_id = t.trace_id;
        let outcome = ForwardOutcome::failed(t, DeliveryError::DispatcherClosed, 0);
        assert_eq!(outcome.trace_id, trace_id);
        assert_eq!(outcome.url, "http://a.test?x=1");
        assert!(outcome.body.is_none());
    }
}
