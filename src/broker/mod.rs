//! Broker client abstraction.
//!
//! Request handlers only see [`BrokerClient`], an object-safe async trait with
//! two operations:
//!
//! - `publish` hands one payload to the broker and waits for acknowledgment
//! - `close` flushes pending messages and releases the connection
//!
//! # Implementations
//!
//! - [`KafkaBroker`] - rdkafka `FutureProducer` with `acks=all` and bounded retries
//! - [`RecordingBroker`] - in-memory client that records payloads and returns
//!   scripted results
//!
//! # Sharing
//!
//! One client is created at startup and shared as `Arc<dyn BrokerClient>`
//! across all request tasks. Implementations must be safe for concurrent
//! `publish` calls without external locking.

mod kafka;
mod recording;

use async_trait::async_trait;
use axum::body::Bytes;
use rdkafka::error::KafkaError;
use thiserror::Error;

pub use kafka::{KafkaBroker, MAX_SEND_RETRIES};
pub use recording::RecordingBroker;

/// Broker-assigned coordinates of a stored message.
///
/// Together with the topic name they identify the message uniquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// Errors surfaced by broker operations.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("{0}")]
    Kafka(#[from] KafkaError),

    #[error("producer is closed")]
    Closed,

    #[error("{0}")]
    Rejected(String),

    #[error("flush task failed: {0}")]
    Flush(String),
}

/// A connection able to publish payloads to a single topic.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Publish `payload` as one unkeyed message and wait for acknowledgment.
    async fn publish(&self, payload: Bytes) -> Result<Delivery, BrokerError>;

    /// Flush and release the connection. Calls after the first are no-ops.
    async fn close(&self) -> Result<(), BrokerError>;

    /// Topic messages are published to.
    fn topic(&self) -> &str;
}
