use std::fmt;

use tokio::signal;
use tracing::{error, warn};

/// Termination request that ended the serving phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Hangup,
    Interrupt,
    Terminate,
    Quit,
    /// The signal source ended without delivering a handled signal
    Unknown,
}

impl ShutdownSignal {
    /// Process exit code for a shutdown caused by this signal.
    pub fn exit_code(self) -> exitcode::ExitCode {
        match self {
            Self::Unknown => 1,
            _ => exitcode::OK,
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hangup => "SIGHUP",
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Quit => "SIGQUIT",
            Self::Unknown => "unknown signal",
        };
        f.write_str(name)
    }
}

/// Wait for SIGHUP, SIGINT, SIGTERM or SIGQUIT (Ctrl+C elsewhere).
///
/// A handler that cannot be installed is logged and skipped; the
/// remaining signals still end the wait.
pub async fn shutdown_signal() -> ShutdownSignal {
    let received = wait_for_signal().await;
    warn!(signal = %received, "Received termination signal, initiating graceful shutdown...");
    received
}

#[cfg(unix)]
async fn wait_for_signal() -> ShutdownSignal {
    use signal::unix::SignalKind;

    tokio::select! {
        s = wait_for_unix(SignalKind::hangup(), ShutdownSignal::Hangup) => s,
        s = wait_for_unix(SignalKind::interrupt(), ShutdownSignal::Interrupt) => s,
        s = wait_for_unix(SignalKind::terminate(), ShutdownSignal::Terminate) => s,
        s = wait_for_unix(SignalKind::quit(), ShutdownSignal::Quit) => s,
    }
}

#[cfg(unix)]
async fn wait_for_unix(kind: signal::unix::SignalKind, kind_name: ShutdownSignal) -> ShutdownSignal {
    match signal::unix::signal(kind) {
        Ok(mut stream) => match stream.recv().await {
            Some(()) => kind_name,
            None => ShutdownSignal::Unknown,
        },
        Err(e) => {
            error!(signal = %kind_name, error = %e, "Failed to install signal handler");
            std::future::pending().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> ShutdownSignal {
    match signal::ctrl_c().await {
        Ok(()) => ShutdownSignal::Interrupt,
        Err(e) => {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handled_signals_exit_cleanly() {
        for signal in [
            ShutdownSignal::Hangup,
            ShutdownSignal::Interrupt,
            ShutdownSignal::Terminate,
            ShutdownSignal::Quit,
        ] {
            assert_eq!(signal.exit_code(), 0, "{signal}");
        }
    }

    #[test]
    fn test_unknown_signal_exit_code() {
        assert_eq!(ShutdownSignal::Unknown.exit_code(), 1);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
        assert_eq!(ShutdownSignal::Quit.to_string(), "SIGQUIT");
    }
}
