//! Liveness endpoint.
//!
//! `GET /api/v2/sys/info/isalive` answers with the configured build version
//! and never touches the broker, so it stays green while Kafka is down.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tracing::{instrument, trace};

use crate::state::AppState;

/// # Response Body
///
/// ```json
/// {"version": "1.0.3"}
/// ```
#[instrument(skip(state))]
pub async fn is_alive(State(state): State<AppState>) -> impl IntoResponse {
    trace!("Liveness probe");

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/json")],
        state.health_body().to_string(),
    )
}
