use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stream_gateway::config::{DEFAULT_LOG_LEVEL, LogConfig, LogFormat};
use stream_gateway::routes::{IS_ALIVE_PATH, STREAM_PATH};
use stream_gateway::server::EXIT_CONFIG_INVALID;
use stream_gateway::{AppState, BrokerClient, Config, KafkaBroker, build_router, metrics};
use stream_gateway::{serve_until, shutdown_signal};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // Logging comes up before config so missing-variable warnings are visible
    for failure in install_tracing(&LogConfig::from_env()) {
        eprintln!("{failure}");
    }

    info!("Starting Stream Gateway v{}", env!("CARGO_PKG_VERSION"));

    let code = match run().await {
        Ok(code) | Err(code) => code,
    };
    // Negative codes wrap, so -1 becomes status 255
    ExitCode::from(code as u8)
}

/// Install the subscriber, retrying with the default level if `log.level`
/// is rejected. Returns one message per failed attempt.
fn install_tracing(log: &LogConfig) -> Vec<String> {
    let mut failures = Vec::new();
    if let Err(e) = init_tracing(&log.level, log.format) {
        failures.push(format!("{e:#}, falling back to {DEFAULT_LOG_LEVEL}"));
        if let Err(e) = init_tracing(DEFAULT_LOG_LEVEL, log.format) {
            failures.push(format!("{e:#}, continuing without logging"));
        }
    }
    failures
}

fn init_tracing(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level).with_context(|| format!("invalid LOG_LEVEL {level:?}"))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Run the gateway, returning the process exit code.
async fn run() -> Result<exitcode::ExitCode, exitcode::ExitCode> {
    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("{e}");
        EXIT_CONFIG_INVALID
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        topic = %config.kafka.topic,
        version = %config.version,
        "Configuration loaded"
    );

    if let Some(addr) = config.metrics_addr() {
        metrics::try_init_metrics(addr);
    }

    // Create the producer
    let broker: Arc<dyn BrokerClient> = Arc::new(KafkaBroker::new(&config.kafka).map_err(|e| {
        error!("Failed to create Kafka producer: {e}");
        exitcode::UNAVAILABLE
    })?);

    let addr = config.server_addr();
    let drain_timeout = config.shutdown_timeout;
    let state = AppState::new(broker.clone(), config);
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  POST {STREAM_PATH}        - Publish request body");
    info!("  GET  {IS_ALIVE_PATH}  - Liveness check");

    let stopped = serve_until(listener, app, broker, shutdown_signal(), drain_timeout).await;
    Ok(stopped.exit_code())
}
