// Path: crates/telemetry/src/http.rs
use axum::{
    body::Bytes,
    error_handling::HandleErrorLayer,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

/// Readiness and status information supplied by the running node.
///
/// Kept as a trait so this crate never depends on the ledger itself.
pub trait HealthProbe: Send + Sync + 'static {
    /// True when the node can serve requests. For the ledger node this means
    /// the chain currently verifies.
    fn is_ready(&self) -> bool;

    /// A JSON summary of the chain served at `/chain`.
    fn chain_summary(&self) -> serde_json::Value;
}

type Probe = Arc<dyn HealthProbe>;

async fn metrics_handler() -> ([(HeaderName, String); 1], Bytes) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::with_capacity(1 << 16);
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::error!(target = "telemetry", error = %e, "Failed to encode prometheus metrics");
    }
    (
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        buf.into(),
    )
}

async fn healthz_handler() -> &'static str {
    "OK"
}

async fn readyz_handler(State(probe): State<Probe>) -> (StatusCode, &'static str) {
    // Verification walks the whole chain; keep it off the async workers.
    let ready = tokio::task::spawn_blocking(move || probe.is_ready())
        .await
        .unwrap_or(false);
    if ready {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "chain failed verification")
    }
}

async fn chain_handler(State(probe): State<Probe>) -> (StatusCode, Json<serde_json::Value>) {
    match tokio::task::spawn_blocking(move || probe.chain_summary()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

async fn handle_service_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}

/// Builds the telemetry router. Exposed separately so it can be driven in tests.
pub fn router(probe: Probe) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .route("/chain", get(chain_handler))
        .with_state(probe)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_service_error))
                .layer(TraceLayer::new_for_http())
                .load_shed()
                .concurrency_limit(8)
                .timeout(Duration::from_secs(5)),
        )
}

/// Serves the telemetry endpoints on `addr` until `shutdown` resolves.
pub async fn run_server<F>(addr: SocketAddr, probe: Probe, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(probe);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target = "telemetry", error = %e, "Failed to bind telemetry http server");
            return;
        }
    };
    match listener.local_addr() {
        Ok(local) => tracing::info!(target = "telemetry", addr = %local, "listening"),
        Err(e) => tracing::warn!(target = "telemetry", error = %e, "listening on unknown address"),
    }

    let graceful = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(async {
        shutdown.await;
        tracing::info!(target = "telemetry", "shutting down gracefully");
    });

    if let Err(e) = graceful.await {
        tracing::error!(target = "telemetry", error = %e, "server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct FixedProbe(bool);

    impl HealthProbe for FixedProbe {
        fn is_ready(&self) -> bool {
            self.0
        }
        fn chain_summary(&self) -> serde_json::Value {
            serde_json::json!({ "length": 1, "is_valid": self.0 })
        }
    }

    async fn status_of(ready: bool, path: &str) -> StatusCode {
        let app = router(Arc::new(FixedProbe(ready)));
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn readyz_reflects_probe() {
        assert_eq!(status_of(true, "/readyz").await, StatusCode::OK);
        assert_eq!(
            status_of(false, "/readyz").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn healthz_and_chain_are_served() {
        assert_eq!(status_of(false, "/healthz").await, StatusCode::OK);
        assert_eq!(status_of(true, "/chain").await, StatusCode::OK);
        assert_eq!(status_of(true, "/missing").await, StatusCode::NOT_FOUND);
    }
}
