//! Fan-out of one accepted request to every configured backend.
//!
//! The [`Dispatcher`] owns the immutable backend list and the gate that
//! bounds how many forwards are on the wire at once. Each forward runs as
//! its own detached Tokio task; submission never waits for a task to
//! start, and nothing ever awaits a task's result.
//!
//! **Shutdown behavior:** [`Dispatcher::drain`] waits (bounded) for
//! in-flight forwards and then closes the gate. Forwards still queued at
//! that point are reported as failed instead of being sent.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::forward::{ForwardOutcome, ForwardTask, Forwarder};
use super::trace::TraceId;
use crate::error::DeliveryError;
use crate::server::Stats;

pub const DEFAULT_MAX_IN_FLIGHT: u32 = 1024;

/// Build the URL a backend receives: the base as configured plus the raw
/// inbound query, if there is one. The inbound path is not carried over.
#[must_use]
pub fn target_url(backend: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{backend}?{q}"),
        _ => backend.to_string(),
    }
}

pub struct Dispatcher {
    backends: Arc<[String]>,
    forwarder: Forwarder,
    stats: Arc<Stats>,
    gate: Arc<Semaphore>,
    capacity: u32,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        backends: impl Into<Arc<[String]>>,
        forwarder: Forwarder,
        stats: Arc<Stats>,
        max_in_flight: u32,
    ) -> Self {
        let capacity = max_in_flight.max(1);
        Self {
            backends: backends.into(),
            forwarder,
            stats,
            gate: Arc::new(Semaphore::new(capacity as usize)),
            capacity,
        }
    }

    #[must_use]
    pub fn backends(&self) -> &[String] {
        &self.backends
    }

    /// The forwards one request fans out into, in backend order.
    #[must_use]
    pub fn plan(&self, trace_id: TraceId, query: Option<&str>) -> Vec<ForwardTask> {
        self.backends
            .iter()
            .map(|backend| ForwardTask {
                trace_id,
                url: target_url(backend, query),
            })
            .collect()
    }

    /// Schedule one forward per backend and return how many were handed
    /// to the runtime. Never blocks on network I/O.
    pub fn dispatch(&self, trace_id: TraceId, query: Option<&str>) -> usize {
        self.plan(trace_id, query)
            .into_iter()
            .map(|task| self.submit(task))
            .filter(|&scheduled| scheduled)
            .count()
    }

    fn submit(&self, task: ForwardTask) -> bool {
        if self.gate.is_closed() {
            self.forwarder
                .report(&ForwardOutcome::failed(task, DeliveryError::DispatcherClosed, 0));
            return false;
        }

        self.stats.scheduled.fetch_add(1, Ordering::Relaxed);
        let gate = Arc::clone(&self.gate);
        let forwarder = self.forwarder.clone();

        tokio::spawn(async move {
            // Held for the whole call so in-flight forwards stay bounded.
            let Ok(_permit) = gate.acquire_owned().await else {
                forwarder.report(&ForwardOutcome::failed(
                    task,
                    DeliveryError::DispatcherClosed,
                    0,
                ));
                return;
            };
            forwarder.forward(task).await;
        });

        true
    }

    /// Number of forwards currently holding a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.gate.available_permits())
    }

    /// Wait up to `grace` for in-flight forwards to finish, then stop
    /// accepting new ones. Returns `true` if everything drained in time.
    pub async fn drain(&self, grace: Duration) -> bool {
        let drained = matches!(
            tokio::time::timeout(grace, self.gate.acquire_many(self.capacity)).await,
            Ok(Ok(_))
        );
        self.gate.close();
        drained
    }
}
