//! # Stream Gateway
//!
//! HTTP front door for a Kafka topic. Every `POST` body is published as one
//! message, and the caller gets a response only after the broker has
//! acknowledged it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace → CORS)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (streamdata, isalive, preflight)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrokerClient (KafkaBroker, acks=all)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Kafka cluster (TLS)                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use stream_gateway::{AppState, Config, KafkaBroker, build_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let broker = Arc::new(KafkaBroker::new(&config.kafka)?);
//!
//!     let state = AppState::new(broker, config);
//!     let app = build_router(state);
//!
//!     // Start the server...
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```bash
//! KAFKA_BROKERS=broker-1:9093,broker-2:9093 TOPIC=events cargo run
//! ```

pub mod broker;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-exports for convenience
pub use broker::{BrokerClient, BrokerError, KafkaBroker, RecordingBroker};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use server::{Stopped, serve_until};
pub use shutdown::{ShutdownSignal, shutdown_signal};
pub use state::AppState;
