//! Inbound request handling.
//!
//! [`forward_handler`] is the Axum fallback that receives every request.
//! Anything but `GET` is answered with `405`. A `GET` gets a fresh
//! [`TraceId`], is handed to the [`Dispatcher`](dispatch::Dispatcher)
//! for fan-out, and is acknowledged with `200` straight away: the caller
//! learns that the request was accepted, never whether it was delivered.

pub mod dispatch;
pub mod forward;
pub mod trace;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::server::AppState;
use trace::{TraceId, TRACE_HEADER};

pub const ACK_BODY: &str = "GET request forwarded to all backend servers";

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if !method.as_str().eq_ignore_ascii_case("GET") {
        state.stats.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::info!(method = %method, path = %uri.path(), "unsupported method rejected");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET")],
            format!("Unsupported HTTP method: {method}"),
        )
            .into_response();
    }

    let trace_id = TraceId::generate();
    let path = uri.path();
    let query = uri.query().filter(|q| !q.is_empty());
    state.stats.received.fetch_add(1, Ordering::Relaxed);

    tracing::info!(
        trace_id = %trace_id,
        path = %path,
        query = query.unwrap_or_default(),
        "request received"
    );

    let scheduled = state.dispatcher.dispatch(trace_id, query);
    tracing::debug!(trace_id = %trace_id, scheduled, "fan-out scheduled");

    (
        StatusCode::OK,
        [(TRACE_HEADER, trace_id.to_string())],
        ACK_BODY,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::server::{build_router, ForwardSettings};

    fn router(backends: &[&str]) -> (axum::Router, Arc<AppState>) {
        let backends = backends.iter().map(|s| (*s).to_string()).collect();
        let state = Arc::new(AppState::new(backends, ForwardSettings::default()));
        (build_router(Arc::clone(&state)), state)
    }

    async fn send(router: axum::Router, method: &str, uri: &str) -> (StatusCode, Response) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        (resp.status(), resp)
    }

    async fn body_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn get_is_acknowledged_with_trace_header() {
        let (router, state) = router(&[]);
        let (status, resp) = send(router, "GET", "/foo?bar=1").await;

        assert_eq!(status, StatusCode::OK);
        let trace = resp.headers().get(&TRACE_HEADER).unwrap().to_str().unwrap();
        assert!(trace.parse::<TraceId>().is_ok());
        assert_eq!(body_text(resp).await, ACK_BODY);
        assert_eq!(state.stats.received.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn other_methods_get_405_naming_the_method() {
        for method in ["POST", "PUT", "DELETE", "PATCH", "OPTIONS"] {
            let (router, state) = router(&["http://127.0.0.1:9"]);
            let (status, resp) = send(router, method, "/foo").await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(resp.headers().get(header::ALLOW).unwrap(), "GET");
            assert_eq!(
                body_text(resp).await,
                format!("Unsupported HTTP method: {method}")
            );
            assert_eq!(state.stats.scheduled.load(Ordering::Relaxed), 0);
            assert_eq!(state.stats.rejected.load(Ordering::Relaxed), 1);
        }
    }

    #[tokio::test]
    async fn extension_method_is_rejected_not_errored() {
        let (router, _) = router(&[]);
        let (status, resp) = send(router, "PURGE", "/").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_text(resp).await, "Unsupported HTTP method: PURGE");
    }

    #[tokio::test]
    async fn each_request_gets_its_own_trace_id() {
        let (router, _) = router(&[]);
        let (_, first) = send(router.clone(), "GET", "/").await;
        let (_, second) = send(router, "GET", "/").await;
        assert_ne!(
            first.headers().get(&TRACE_HEADER),
            second.headers().get(&TRACE_HEADER)
        );
    }
}
