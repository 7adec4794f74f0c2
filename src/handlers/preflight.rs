use axum::http::StatusCode;

/// CORS preflight: `200` with an empty body.
///
/// The CORS headers themselves are added by the response middleware, so
/// preflight never touches the request body or the broker.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
