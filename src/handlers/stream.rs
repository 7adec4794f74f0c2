//! Stream publishing endpoint.
//!
//! # Endpoints
//!
//! - `POST /api/v1/streamdata` - Publish the raw request body as one message
//! - `OPTIONS /api/v1/streamdata` - CORS preflight (see [`super::preflight`])
//!
//! # Request Lifecycle
//!
//! ```text
//! Received ──► BodyRead ──► Published ──► ResponseSent (200)
//!                 │             │
//!                 ▼             ▼
//!              Failed ◄────── Failed  ──► ResponseSent (500)
//! ```
//!
//! The body is opaque: it is neither parsed nor validated, only bounded by
//! `MAX_REQUEST_BODY_SIZE`.

use std::time::Instant;

use axum::body::{Body, to_bytes};
use axum::extract::State;
use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::GatewayResponse;
use crate::state::AppState;

/// Publish the request body and wait for the broker to acknowledge it.
///
/// # Responses
///
/// - `200` `{"statuscode": "200", "status": "OK", "message": "Stream data sent successfully"}`
/// - `500` `{"statuscode": "500", "status": "ERROR", "message": "Could not read body data ..."}`
/// - `500` `{"statuscode": "500", "status": "ERROR", "message": "Could not send stream data ..."}`
#[instrument(skip_all)]
pub async fn stream_data(State(state): State<AppState>, body: Body) -> AppResult<GatewayResponse> {
    let payload = to_bytes(body, state.config.max_request_body_size)
        .await
        .map_err(|e| {
            metrics::record_body_read_failure();
            AppError::BodyRead(e.to_string())
        })?;
    debug!(bytes = payload.len(), "Request body read");

    let topic = state.broker.topic();
    let started = Instant::now();
    let result = state.broker.publish(payload).await;
    metrics::record_publish(topic, result.is_ok(), started.elapsed().as_secs_f64());

    let delivery = result.map_err(|e| AppError::Publish(e.to_string()))?;
    debug!(
        topic,
        partition = delivery.partition,
        offset = delivery.offset,
        "Stream data acknowledged"
    );

    Ok(GatewayResponse::ok())
}
