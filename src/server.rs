//! Server lifecycle.
//!
//! ```text
//! Starting ──► Running ──signal──► Draining ──► Stopped
//!                 │                   │
//!                 │            close broker, then
//!                 │            stop accepting and wait
//!                 │            for in-flight requests
//!                 │            (bounded by the drain window)
//!                 │
//!                 └──server error──► close broker ──► Stopped (SOFTWARE)
//! ```
//!
//! The broker is closed before the listener drains. Aborting the server
//! task after the drain window stops the accept loop; connection tasks
//! still running end with the runtime.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::broker::BrokerClient;
use crate::shutdown::ShutdownSignal;

/// Exit code when the configuration cannot be loaded (255 as a process status).
pub const EXIT_CONFIG_INVALID: exitcode::ExitCode = -1;

/// How the serving phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// A termination signal started the drain.
    Signal(ShutdownSignal),
    /// The accept loop ended on its own.
    ServerFailed,
}

impl Stopped {
    pub fn exit_code(self) -> exitcode::ExitCode {
        match self {
            Self::Signal(signal) => signal.exit_code(),
            Self::ServerFailed => exitcode::SOFTWARE,
        }
    }
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain.
///
/// The broker is closed exactly once on every exit path. Errors from
/// closing or draining are logged and do not change the outcome.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    broker: Arc<dyn BrokerClient>,
    shutdown: F,
    drain_timeout: Duration,
) -> Stopped
where
    F: Future<Output = ShutdownSignal>,
{
    let token = CancellationToken::new();
    let mut server = spawn_server(listener, app, token.clone());

    let signal = tokio::select! {
        signal = shutdown => signal,
        result = &mut server => {
            log_server_exit(result);
            close_broker(broker.as_ref()).await;
            return Stopped::ServerFailed;
        }
    };

    info!(%signal, "Closing broker client");
    close_broker(broker.as_ref()).await;

    info!(?drain_timeout, "Draining HTTP server");
    token.cancel();
    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => log_server_exit(result),
        Err(_) => {
            warn!(
                ?drain_timeout,
                "Drain window elapsed, aborting in-flight requests"
            );
            server.abort();
        }
    }

    info!("Server shutdown complete");
    Stopped::Signal(signal)
}

fn spawn_server(
    listener: TcpListener,
    app: Router,
    token: CancellationToken,
) -> JoinHandle<io::Result<()>> {
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(token.cancelled_owned())
            .await
    })
}

async fn close_broker(broker: &dyn BrokerClient) {
    if let Err(e) = broker.close().await {
        error!(error = %e, "Failed to close broker client");
    }
}

fn log_server_exit(result: Result<io::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => info!("HTTP server stopped"),
        Ok(Err(e)) => error!(error = %e, "HTTP server error"),
        Err(e) => error!(error = %e, "HTTP server task failed"),
    }
}
