//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (applied in order)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Adds X-Request-Id header
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← Fixed CORS set + Content-Type on every response
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! - `POST|OPTIONS /api/v1/streamdata` - Publish a payload
//! - `GET|OPTIONS /api/v2/sys/info/isalive` - Liveness

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{RequestIdLayer, cors_headers, request_span};
use crate::state::AppState;

pub const STREAM_PATH: &str = "/api/v1/streamdata";
pub const IS_ALIVE_PATH: &str = "/api/v2/sys/info/isalive";

/// Build the application router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            STREAM_PATH,
            post(handlers::stream_data).options(handlers::preflight),
        )
        .route(
            IS_ALIVE_PATH,
            get(handlers::is_alive).options(handlers::preflight),
        )
        .layer(from_fn(cors_headers))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(RequestIdLayer::new())
        .with_state(state)
}
