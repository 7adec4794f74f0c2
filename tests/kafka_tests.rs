//! Publish through a real Kafka broker started with testcontainers.
//!
//! Needs Docker and binds host port 9092 (the image advertises
//! `localhost:9092`), so it is ignored by default.
//!
//! Run with: `cargo test --test kafka_tests -- --ignored`
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::Message;
use rdkafka::consumer::{Consumer, StreamConsumer};
use reqwest::StatusCode;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tokio::net::TcpListener;

use stream_gateway::config::{KafkaConfig, TlsConfig};
use stream_gateway::routes::STREAM_PATH;
use stream_gateway::{AppState, BrokerClient, Config, KafkaBroker, build_router};

const IMAGE: &str = "apache/kafka";
const TAG: &str = "3.8.0";
const KAFKA_PORT: u16 = 9092;
const TOPIC: &str = "gateway-test";

async fn start_kafka() -> ContainerAsync<GenericImage> {
    GenericImage::new(IMAGE, TAG)
        .with_exposed_port(KAFKA_PORT.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Kafka Server started"))
        .with_mapped_port(KAFKA_PORT, KAFKA_PORT.tcp())
        .with_startup_timeout(Duration::from_secs(120))
        .start()
        .await
        .expect("Failed to start Kafka container")
}

fn kafka_config() -> KafkaConfig {
    KafkaConfig {
        brokers: vec![format!("localhost:{KAFKA_PORT}")],
        topic: TOPIC.to_string(),
        tls: TlsConfig {
            enabled: false,
            ..TlsConfig::default()
        },
        message_timeout: Duration::from_secs(30),
        flush_timeout: Duration::from_secs(10),
    }
}

fn consumer() -> StreamConsumer {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", format!("localhost:{KAFKA_PORT}"))
        .set("group.id", "gateway-test-reader")
        .set("auto.offset.reset", "earliest")
        .create()
        .expect("Failed to create consumer");
    consumer.subscribe(&[TOPIC]).expect("Failed to subscribe");
    consumer
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_request_body_reaches_topic() {
    let _kafka = start_kafka().await;

    let kafka = kafka_config();
    let broker: Arc<dyn BrokerClient> =
        Arc::new(KafkaBroker::new(&kafka).expect("Failed to create producer"));
    let config = Config {
        kafka,
        ..Config::default()
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}{}", listener.local_addr().unwrap(), STREAM_PATH);
    let app = build_router(AppState::new(broker.clone(), config));
    tokio::spawn(async move { axum::serve(listener, app).await });

    let payload = r#"{"event":"click","target":"sort-stock"}"#;
    let response = reqwest::Client::new()
        .post(&url)
        .body(payload)
        .send()
        .await
        .expect("Stream request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let consumer = consumer();
    let message = tokio::time::timeout(Duration::from_secs(30), consumer.recv())
        .await
        .expect("Timed out waiting for message")
        .expect("Consumer error");
    assert_eq!(message.payload(), Some(payload.as_bytes()));
    assert!(message.key().is_none());

    broker.close().await.expect("Failed to close producer");
}
