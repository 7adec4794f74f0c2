//! Application configuration loaded from environment variables.
//!
//! # Required Variables
//!
//! - `KAFKA_BROKERS`: Comma-separated `host:port` list of bootstrap brokers
//! - `TOPIC`: Topic every request body is published to
//!
//! Startup aborts when either is missing or empty.
//!
//! # Recommended Variables
//!
//! - `LOG_LEVEL`: Log filter (default: `info`)
//! - `SERVER_PORT`: Listen port (default: 8080)
//!
//! A warning is logged when these fall back to their defaults.
//!
//! # Broker Transport
//!
//! - `KAFKA_TLS_ENABLED`: Use SSL to reach the brokers (default: true)
//! - `KAFKA_TLS_SKIP_VERIFY`: Disable certificate validation (default: false)
//! - `KAFKA_TLS_CA_LOCATION`: Path to a CA bundle for broker certificates
//! - `KAFKA_MESSAGE_TIMEOUT_MS`: Upper bound for a single publish (default: 30000)
//! - `KAFKA_FLUSH_TIMEOUT_SECS`: Upper bound for flushing on close (default: 10)
//!
//! # Server Tuning
//!
//! - `HOST`: Bind address (default: `0.0.0.0`)
//! - `VERSION`: Build version echoed by the liveness endpoint (default: empty)
//! - `MAX_REQUEST_BODY_SIZE`: Largest accepted payload in bytes (default: 10MB)
//! - `SHUTDOWN_TIMEOUT_SECS`: Drain window for in-flight requests (default: 30)
//! - `METRICS_PORT`: Prometheus listener port (default: 0 = disabled)
//! - `LOG_FORMAT`: `json` for JSON lines, anything else for text

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{error, warn};

use crate::error::{AppError, AppResult};

/// Variables whose absence aborts startup.
pub const REQUIRED_VARS: [&str; 2] = ["KAFKA_BROKERS", "TOPIC"];

/// Variables whose absence is reported but tolerated.
pub const RECOMMENDED_VARS: [&str; 2] = ["LOG_LEVEL", "SERVER_PORT"];

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_PORT: u16 = 8080;

/// TLS settings for the broker connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub enabled: bool,
    /// Skip broker certificate validation. Only for clusters with
    /// self-signed certificates and no CA bundle at hand.
    pub skip_verify: bool,
    pub ca_location: Option<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_verify: false,
            ca_location: None,
        }
    }
}

/// Kafka producer settings.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Bootstrap brokers, already split and trimmed
    pub brokers: Vec<String>,
    pub topic: String,
    pub tls: TlsConfig,
    /// How long a publish may wait for acknowledgment, retries included
    pub message_timeout: Duration,
    /// How long `close()` waits for queued messages to drain
    pub flush_timeout: Duration,
}

impl KafkaConfig {
    /// Broker list in the form librdkafka expects.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

/// Application configuration, resolved once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    pub host: String,
    pub port: u16,
    /// Build version reported by the liveness endpoint
    pub version: String,
    pub max_request_body_size: usize,
    pub shutdown_timeout: Duration,

    // =========================================================================
    // Broker Configuration
    // =========================================================================
    pub kafka: KafkaConfig,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    pub metrics_port: u16,
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging settings from `LOG_LEVEL` and `LOG_FORMAT`.
///
/// Loaded on their own, ahead of [`Config`], so the subscriber is installed
/// before configuration warnings are logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `stream_gateway=debug`
    pub level: String,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvSource(lookup);
        let format = match vars.get("LOG_FORMAT") {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            level: vars
                .get("LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or any
    /// value fails to parse.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvSource(lookup);
        vars.check_presence()?;

        let brokers = parse_broker_list(&vars.get("KAFKA_BROKERS").unwrap_or_default());
        let topic = vars.get("TOPIC").unwrap_or_default();

        let config = Self {
            host: vars.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: vars.parse("SERVER_PORT", DEFAULT_PORT)?,
            version: vars.raw("VERSION").unwrap_or_default(),
            max_request_body_size: vars.parse("MAX_REQUEST_BODY_SIZE", 10 * 1024 * 1024)?,
            shutdown_timeout: Duration::from_secs(vars.parse("SHUTDOWN_TIMEOUT_SECS", 30)?),

            kafka: KafkaConfig {
                brokers,
                topic,
                tls: TlsConfig {
                    enabled: vars.flag("KAFKA_TLS_ENABLED", true)?,
                    skip_verify: vars.flag("KAFKA_TLS_SKIP_VERIFY", false)?,
                    ca_location: vars.get("KAFKA_TLS_CA_LOCATION"),
                },
                message_timeout: Duration::from_millis(
                    vars.parse("KAFKA_MESSAGE_TIMEOUT_MS", 30_000)?,
                ),
                flush_timeout: Duration::from_secs(vars.parse("KAFKA_FLUSH_TIMEOUT_SECS", 10)?),
            },

            metrics_port: vars.parse("METRICS_PORT", 0)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate values that parsed but make no sense together.
    fn validate(&self) -> AppResult<()> {
        if self.kafka.brokers.is_empty() {
            return Err(AppError::Config(
                "KAFKA_BROKERS contains no broker addresses".to_string(),
            ));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::Config(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.shutdown_timeout.is_zero() {
            return Err(AppError::Config(
                "SHUTDOWN_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.kafka.message_timeout.is_zero() {
            return Err(AppError::Config(
                "KAFKA_MESSAGE_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address, `None` when disabled.
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_enabled()
            .then(|| SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            version: String::new(),
            max_request_body_size: 10 * 1024 * 1024, // 10MB
            shutdown_timeout: Duration::from_secs(30),
            kafka: KafkaConfig {
                brokers: vec!["localhost:9092".to_string()],
                topic: "events".to_string(),
                tls: TlsConfig::default(),
                message_timeout: Duration::from_secs(30),
                flush_timeout: Duration::from_secs(10),
            },
            metrics_port: 0,
        }
    }
}

/// Split a comma-separated broker list, dropping blanks.
pub fn parse_broker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Variable source with the parsing rules shared by every setting.
struct EnvSource<F>(F);

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Value as set, including the empty string.
    fn raw(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }

    /// Trimmed value, `None` when unset or blank.
    fn get(&self, name: &str) -> Option<String> {
        self.raw(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(val) => val
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {name}: {e}"))),
            None => Ok(default),
        }
    }

    fn flag(&self, name: &str, default: bool) -> AppResult<bool> {
        match self.get(name).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) => match v.as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(AppError::Config(format!(
                    "Invalid {name}: expected true or false, got '{v}'"
                ))),
            },
        }
    }

    /// Report every missing variable, failing if a required one is absent.
    fn check_presence(&self) -> AppResult<()> {
        for name in RECOMMENDED_VARS {
            if self.get(name).is_none() {
                warn!("{name} envar is empty please set it");
            }
        }

        let missing: Vec<&str> = REQUIRED_VARS
            .into_iter()
            .filter(|name| self.get(name).is_none())
            .collect();

        for name in &missing {
            error!("{name} envar is mandatory please set it");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "missing mandatory environment variables: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> AppResult<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    const MINIMAL: [(&str, &str); 2] = [("KAFKA_BROKERS", "kafka-0:9092"), ("TOPIC", "events")];

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load(&MINIMAL).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.version, "");
        assert_eq!(config.kafka.topic, "events");
        assert_eq!(config.kafka.brokers, vec!["kafka-0:9092".to_string()]);
        assert_eq!(config.kafka.tls, TlsConfig::default());
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
        assert!(!config.metrics_enabled());
    }

    #[test]
    fn test_missing_brokers_is_fatal() {
        let err = load(&[("TOPIC", "events")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("KAFKA_BROKERS"));
    }

    #[test]
    fn test_missing_topic_is_fatal() {
        let err = load(&[("KAFKA_BROKERS", "kafka-0:9092")]).unwrap_err();
        assert!(err.to_string().contains("TOPIC"));
    }

    #[test]
    fn test_empty_required_value_counts_as_missing() {
        let err = load(&[("KAFKA_BROKERS", "  "), ("TOPIC", "events")]).unwrap_err();
        assert!(err.to_string().contains("KAFKA_BROKERS"));
    }

    #[test]
    fn test_both_missing_are_reported_together() {
        let err = load(&[]).unwrap_err().to_string();
        assert!(err.contains("KAFKA_BROKERS"));
        assert!(err.contains("TOPIC"));
    }

    #[test]
    fn test_broker_list_of_only_commas_is_rejected() {
        let err = load(&[("KAFKA_BROKERS", ",,"), ("TOPIC", "events")]).unwrap_err();
        assert!(err.to_string().contains("no broker addresses"));
    }

    #[test]
    fn test_parse_broker_list_trims_and_drops_blanks() {
        assert_eq!(
            parse_broker_list(" a:9092, b:9093 ,,c:9094"),
            vec!["a:9092", "b:9093", "c:9094"]
        );
    }

    #[test]
    fn test_bootstrap_servers_joined() {
        let config = load(&[("KAFKA_BROKERS", "a:1, b:2"), ("TOPIC", "t")]).unwrap();
        assert_eq!(config.kafka.bootstrap_servers(), "a:1,b:2");
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SERVER_PORT", "http"));
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("Invalid SERVER_PORT"));
    }

    #[test]
    fn test_version_is_kept_verbatim() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("VERSION", " 1.2.3-rc1 "));
        let config = load(&vars).unwrap();
        assert_eq!(config.version, " 1.2.3-rc1 ");
    }

    #[test]
    fn test_tls_flags() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("KAFKA_TLS_SKIP_VERIFY", "TRUE"));
        vars.push(("KAFKA_TLS_CA_LOCATION", "/etc/ssl/kafka-ca.pem"));
        let config = load(&vars).unwrap();
        assert!(config.kafka.tls.enabled);
        assert!(config.kafka.tls.skip_verify);
        assert_eq!(
            config.kafka.tls.ca_location.as_deref(),
            Some("/etc/ssl/kafka-ca.pem")
        );
    }

    #[test]
    fn test_invalid_flag_is_config_error() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("KAFKA_TLS_ENABLED", "maybe"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_zero_shutdown_timeout_rejected() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SHUTDOWN_TIMEOUT_SECS", "0"));
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("SHUTDOWN_TIMEOUT_SECS"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_server_addr_format() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("HOST", "127.0.0.1"));
        vars.push(("SERVER_PORT", "9000"));
        let config = load(&vars).unwrap();
        assert_eq!(config.server_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_metrics_addr() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("METRICS_PORT", "9090"));
        let config = load(&vars).unwrap();
        assert_eq!(
            config.metrics_addr(),
            Some(SocketAddr::from(([0, 0, 0, 0], 9090)))
        );
    }

    #[test]
    fn test_log_config_defaults() {
        assert_eq!(LogConfig::from_lookup(|_| None), LogConfig::default());
        assert_eq!(
            LogConfig::from_lookup(|_| Some("   ".to_string())),
            LogConfig::default()
        );
    }

    #[test]
    fn test_padded_log_level_is_trimmed() {
        let log = LogConfig::from_lookup(|name| match name {
            "LOG_LEVEL" => Some(" debug ".to_string()),
            _ => None,
        });

        assert_eq!(log.level, "debug");
        assert!(tracing_subscriber::EnvFilter::try_new(&log.level).is_ok());
    }

    #[test]
    fn test_log_format_json_is_case_insensitive() {
        let log = LogConfig::from_lookup(|name| match name {
            "LOG_FORMAT" => Some(" JSON ".to_string()),
            _ => None,
        });
        assert_eq!(log.format, LogFormat::Json);

        let log = LogConfig::from_lookup(|name| match name {
            "LOG_FORMAT" => Some("pretty".to_string()),
            _ => None,
        });
        assert_eq!(log.format, LogFormat::Text);
    }
}
