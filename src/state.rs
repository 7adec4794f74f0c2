//! Shared application state for Axum handlers.
//!
//! Built once at startup and cloned into every request. The broker client
//! is the single producer connection for the whole process; handlers only
//! call `publish` on it; `close` is reserved for the server lifecycle.

use std::sync::Arc;

use crate::broker::BrokerClient;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    /// The process-wide broker connection
    pub broker: Arc<dyn BrokerClient>,
    /// Application configuration
    pub config: Arc<Config>,
    /// Pre-rendered liveness body
    health_body: Arc<str>,
}

impl AppState {
    pub fn new(broker: Arc<dyn BrokerClient>, config: Config) -> Self {
        let health_body = render_health_body(&config.version).into();
        Self {
            broker,
            config: Arc::new(config),
            health_body,
        }
    }

    /// Body returned by the liveness endpoint.
    pub fn health_body(&self) -> &str {
        &self.health_body
    }
}

/// `{"version": "<version>"}` with the version inserted as configured.
fn render_health_body(version: &str) -> String {
    format!("{{\"version\": \"{version}\"}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_body_plain_version() {
        assert_eq!(render_health_body("1.0.3"), r#"{"version": "1.0.3"}"#);
    }

    #[test]
    fn test_health_body_empty_version() {
        assert_eq!(render_health_body(""), r#"{"version": ""}"#);
    }

    #[test]
    fn test_health_body_inserts_version_verbatim() {
        assert_eq!(
            render_health_body(r#"1.0"beta\x"#),
            r#"{"version": "1.0"beta\x"}"#
        );
    }
}
