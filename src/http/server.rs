//! Router assembly and HTTP listener.
//!
//! The shared state (database handle + metrics recorder handle) is injected
//! through axum's typed `State` extractor, so every handler gets the
//! connection before it runs, with no opt-out.

use std::net::SocketAddr;

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::Db;
use crate::metrics::HTTP_REQUESTS_TOTAL;

/// Shared application state, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub prometheus: PrometheusHandle,
}

/// Build the full application router with all routes under `/api/v1`.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::todos::router());

    Router::new()
        .nest("/api/v1", api)
        // axum 0.8 nesting matches "/api/v1" but not the spec's trailing-slash
        // form, so the liveness route is registered explicitly as well
        .route("/api/v1/", axum::routing::get(routes::health::liveness))
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Count every request by method, matched route, and response status.
///
/// The label is the route template ("/api/v1/users/{id}"), not the raw URI:
/// raw paths would mint a new series per distinct request line, which an
/// unauthenticated caller can grow without bound.
async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(req).await;
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method,
        "path" => path,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    response
}

/// Bind the listener and serve until shutdown.
pub async fn run_server(state: AppState, port: u16) -> Result<(), ServerError> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Listener-level error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
