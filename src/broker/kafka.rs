use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use tracing::{debug, error, info, instrument, warn};

use super::{BrokerClient, BrokerError, Delivery};
use crate::config::KafkaConfig;

/// Retry budget for transient send failures before a publish is failed.
pub const MAX_SEND_RETRIES: u32 = 10;

/// Kafka producer that waits for every message to be acknowledged.
///
/// Each `publish` resolves only after all in-sync replicas confirmed the
/// write (`acks=all`) or librdkafka gave up after [`MAX_SEND_RETRIES`]
/// retries / `message.timeout.ms`. Messages carry no key, so the default
/// partitioner spreads them across partitions.
pub struct KafkaBroker {
    producer: FutureProducer,
    topic: String,
    /// Bounds how long `send` waits for room in the local queue
    queue_timeout: Duration,
    flush_timeout: Duration,
    closed: AtomicBool,
}

impl KafkaBroker {
    /// Create the producer. No network traffic happens until the first publish.
    ///
    /// # Errors
    ///
    /// Returns `BrokerError::Kafka` if librdkafka rejects the configuration.
    #[instrument(skip(config), fields(topic = %config.topic))]
    pub fn new(config: &KafkaConfig) -> Result<Self, BrokerError> {
        debug!("Creating Kafka message producer");
        info!(brokers = %config.brokers.join(", "), "Kafka brokers");

        if config.tls.enabled && config.tls.skip_verify {
            warn!("Broker certificate validation is disabled (KAFKA_TLS_SKIP_VERIFY)");
        } else if !config.tls.enabled {
            warn!("Broker connection is not encrypted (KAFKA_TLS_ENABLED=false)");
        }

        let producer: FutureProducer = Self::client_config(config).create().map_err(|e| {
            error!(error = %e, "Failed to start Kafka producer");
            BrokerError::from(e)
        })?;

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            queue_timeout: config.message_timeout,
            flush_timeout: config.flush_timeout,
            closed: AtomicBool::new(false),
        })
    }

    /// librdkafka settings derived from the application config.
    pub fn client_config(config: &KafkaConfig) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", config.bootstrap_servers())
            .set("acks", "all")
            .set("message.send.max.retries", MAX_SEND_RETRIES.to_string())
            .set(
                "message.timeout.ms",
                config.message_timeout.as_millis().to_string(),
            );

        if config.tls.enabled {
            client_config.set("security.protocol", "ssl").set(
                "enable.ssl.certificate.verification",
                (!config.tls.skip_verify).to_string(),
            );
            if let Some(ca_location) = &config.tls.ca_location {
                client_config.set("ssl.ca.location", ca_location);
            }
        }

        client_config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerClient for KafkaBroker {
    #[instrument(skip(self, payload), fields(topic = %self.topic, bytes = payload.len()))]
    async fn publish(&self, payload: Bytes) -> Result<Delivery, BrokerError> {
        if self.is_closed() {
            return Err(BrokerError::Closed);
        }

        let record = FutureRecord::<(), [u8]>::to(&self.topic).payload(payload.as_ref());

        match self.producer.send(record, self.queue_timeout).await {
            Ok((partition, offset)) => {
                debug!(
                    partition,
                    offset,
                    "Data stored with unique identifier {}/{partition}/{offset}",
                    self.topic
                );
                Ok(Delivery { partition, offset })
            }
            Err((e, _message)) => {
                error!(error = %e, "Failed to store data");
                Err(e.into())
            }
        }
    }

    async fn close(&self) -> Result<(), BrokerError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("Kafka producer already closed");
            return Ok(());
        }

        let producer = self.producer.clone();
        let timeout = self.flush_timeout;

        // flush() blocks the calling thread until the queue drains
        match tokio::task::spawn_blocking(move || producer.flush(timeout)).await {
            Ok(Ok(())) => {
                info!("Kafka producer flushed");
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(BrokerError::Flush(e.to_string())),
        }
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}
