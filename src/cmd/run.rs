//! `relaycast run`: start the proxy server.
//!
//! Loads and validates configuration before anything is bound, starts the
//! Axum server with graceful shutdown, and drains in-flight forwards once
//! the listener has stopped.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::config::{self, validation};
use crate::error::RelaycastError;
use crate::logging;
use crate::proxy::forward::ForwardTimeouts;
use crate::server::{self, AppState, ForwardSettings};

pub async fn execute(args: RunArgs) -> Result<(), RelaycastError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let source = config::resolve_source(args.config.as_deref()).await?;
    let config = source.load_with_port(args.port).await.inspect_err(|e| {
        tracing::error!(path = %source.path().display(), error = %e, "failed to load configuration");
    })?;

    for warning in validation::lint_backends(&config) {
        tracing::warn!(
            field = %warning.field,
            error = %warning.message,
            "suspicious backend configuration"
        );
    }

    tracing::info!(
        path = %source.path().display(),
        format = source.format().name(),
        port = config.server.port,
        backends = ?config.backends(),
        "loaded configuration"
    );

    let settings = ForwardSettings {
        timeouts: ForwardTimeouts {
            connect: Duration::from_millis(args.connect_timeout_ms),
            read: Duration::from_millis(args.read_timeout_ms),
        },
        max_in_flight: args.max_in_flight,
    };
    let backend_count = config.backends().len();
    let state = Arc::new(AppState::new(config.backend.servers, settings));

    let router = server::build_router(Arc::clone(&state));

    let ip: IpAddr = args.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        backends = backend_count,
        max_in_flight = args.max_in_flight,
        "relaycast started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    let in_flight = state.dispatcher.in_flight();
    if in_flight > 0 {
        tracing::info!(in_flight, "waiting for in-flight forwards");
    }
    let grace = Duration::from_secs(args.drain_timeout_secs);
    if !state.dispatcher.drain(grace).await {
        tracing::warn!(
            grace_secs = args.drain_timeout_secs,
            "drain timed out, abandoning remaining forwards"
        );
    }

    let stats = state.stats.snapshot();
    tracing::info!(
        received = stats.received,
        rejected = stats.rejected,
        scheduled = stats.scheduled,
        succeeded = stats.succeeded,
        failed = stats.failed,
        "relaycast stopped"
    );
    Ok(())
}
