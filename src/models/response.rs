use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

/// Message returned when the broker acknowledged the payload.
pub const PUBLISH_SUCCESS_MESSAGE: &str = "Stream data sent successfully";

/// Outcome marker carried in every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// Body returned by the stream endpoint.
///
/// ```json
/// {
/// 	"statuscode": "200",
/// 	"status": "OK",
/// 	"message": "Stream data sent successfully"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// HTTP status code as a string ("200", "500")
    #[serde(rename = "statuscode")]
    pub status_code: String,
    pub status: ResponseStatus,
    pub message: String,
}

impl GatewayResponse {
    /// Successful publish.
    pub fn ok() -> Self {
        Self {
            status_code: StatusCode::OK.as_u16().to_string(),
            status: ResponseStatus::Ok,
            message: PUBLISH_SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Failed request, reported as an internal server error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16().to_string(),
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }

    /// HTTP status matching `status_code`.
    pub fn http_status(&self) -> StatusCode {
        self.status_code
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Serialize with one tab per indentation level.
    pub fn to_indented_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
        self.serialize(&mut ser)?;
        Ok(buf)
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let status = self.http_status();
        match self.to_indented_json() {
            Ok(body) => (status, [(CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response_fields() {
        let response = GatewayResponse::ok();
        assert_eq!(response.status_code, "200");
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.message, "Stream data sent successfully");
        assert_eq!(response.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_error_response_fields() {
        let response = GatewayResponse::error("Could not send stream data boom");
        assert_eq!(response.status_code, "500");
        assert_eq!(response.status, ResponseStatus::Error);
        assert_eq!(response.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_indented_json_layout() {
        let json = GatewayResponse::ok().to_indented_json().unwrap();
        let expected = "{\n\t\"statuscode\": \"200\",\n\t\"status\": \"OK\",\n\t\"message\": \"Stream data sent successfully\"\n}";
        assert_eq!(String::from_utf8(json).unwrap(), expected);
    }

    #[test]
    fn test_error_status_serializes_uppercase() {
        let json = serde_json::to_string(&GatewayResponse::error("x")).unwrap();
        assert!(json.contains("\"status\":\"ERROR\""));
        assert!(json.contains("\"statuscode\":\"500\""));
    }

    #[test]
    fn test_unparseable_status_code_falls_back_to_500() {
        let response = GatewayResponse {
            status_code: "abc".to_string(),
            status: ResponseStatus::Error,
            message: String::new(),
        };
        assert_eq!(response.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
