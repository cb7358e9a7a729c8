//! Health check routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use common::policy::PolicyError;

use crate::state::State as GatewayState;

pub fn router() -> Router<GatewayState> {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
}

/// Liveness: the process is up.
async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness: the document store answers lookups. A clean miss counts as
/// healthy; only a provider failure marks us unready.
async fn readyz_handler(State(state): State<GatewayState>) -> StatusCode {
    match state.gate().store().get("__readyz__").await {
        Ok(_) | Err(PolicyError::NotFound(_)) => StatusCode::OK,
        Err(err) => {
            tracing::warn!("readiness probe failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
