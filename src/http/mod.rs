//! HTTP server and routing.
//!
//! Builds the axum router for the `/v1` API plus the Prometheus `/metrics`
//! endpoint, and runs the serve loop with graceful shutdown.

pub mod hello;
pub mod users;

use crate::db::Database;
use crate::events::UserEvents;
use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::time::Instant;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub events: UserEvents,
}

/// Build the application router.
pub fn router(db: Database, events: UserEvents) -> Router {
    let state = AppState { db, events };

    Router::new()
        .route("/v1/hello", post(hello::greet))
        .route("/v1/user", post(users::create))
        .route("/v1/user/:id", get(users::get_by_id).delete(users::remove))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn serve(addr: SocketAddr, db: Database, events: UserEvents) -> anyhow::Result<()> {
    let app = router(db, events);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Record request count and latency per matched route.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().clone();

    let response = next.run(request).await;

    crate::metrics::record_request(
        method.as_str(),
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to install shutdown signal handler"),
    }
}
