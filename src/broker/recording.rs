use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use super::{BrokerClient, BrokerError, Delivery};

/// In-memory broker client that records what it is given.
///
/// Every accepted payload is appended to an internal log and assigned the
/// next offset on partition 0. Failures can be scripted two ways:
///
/// - [`RecordingBroker::failing`] rejects every publish with a fixed cause
/// - [`RecordingBroker::rejecting`] rejects only payloads equal to a sentinel
///
/// Used as the broker double in tests.
pub struct RecordingBroker {
    topic: String,
    published: Mutex<Vec<Bytes>>,
    next_offset: AtomicI64,
    publish_calls: AtomicUsize,
    close_calls: AtomicUsize,
    closed: AtomicBool,
    failure: Option<String>,
    sentinel: Option<(Bytes, String)>,
}

impl RecordingBroker {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            published: Mutex::new(Vec::new()),
            next_offset: AtomicI64::new(0),
            publish_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            failure: None,
            sentinel: None,
        }
    }

    /// Fail every publish with `cause`.
    pub fn failing(mut self, cause: impl Into<String>) -> Self {
        self.failure = Some(cause.into());
        self
    }

    /// Fail publishes whose payload equals `sentinel`.
    pub fn rejecting(mut self, sentinel: impl Into<Bytes>, cause: impl Into<String>) -> Self {
        self.sentinel = Some((sentinel.into(), cause.into()));
        self
    }

    /// Payloads accepted so far, in publish order.
    pub async fn published(&self) -> Vec<Bytes> {
        self.published.lock().await.clone()
    }

    /// Number of `publish` invocations, accepted or not.
    pub fn publish_calls(&self) -> usize {
        self.publish_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerClient for RecordingBroker {
    async fn publish(&self, payload: Bytes) -> Result<Delivery, BrokerError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);

        if self.is_closed() {
            return Err(BrokerError::Closed);
        }
        if let Some(cause) = &self.failure {
            return Err(BrokerError::Rejected(cause.clone()));
        }
        if let Some((sentinel, cause)) = &self.sentinel
            && *sentinel == payload
        {
            return Err(BrokerError::Rejected(cause.clone()));
        }

        let mut published = self.published.lock().await;
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        published.push(payload);
        debug!(offset, topic = %self.topic, "Recorded payload");

        Ok(Delivery {
            partition: 0,
            offset,
        })
    }

    async fn close(&self) -> Result<(), BrokerError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}
