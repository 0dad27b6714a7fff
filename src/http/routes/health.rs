//! Liveness and metrics-exposition endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::http::server::AppState;

/// GET / - trivial liveness response.
pub(crate) async fn liveness() -> Json<Value> {
    Json(Value::Null)
}

/// GET /metrics - Prometheus text exposition from the installed recorder.
async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/metrics", get(metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn liveness_body_is_null() {
        let Json(body) = liveness().await;
        assert!(body.is_null());
    }
}
