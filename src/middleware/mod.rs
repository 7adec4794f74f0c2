//! HTTP middleware for CORS and request correlation.
//!
//! ```text
//! Request → Request ID → Trace span → CORS → Handler → Response
//!               ↓                       ↓
//!        X-Request-Id header     fixed CORS + JSON content type
//! ```

pub mod cors;
pub mod request_id;

pub use cors::cors_headers;
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, request_span};
