//! Shutdown signals.

use std::{fmt, io};

use thiserror::Error;
use tokio::signal;

#[derive(Debug, Error)]
#[error("failed to install {signal} handler: {source}")]
pub(crate) struct SignalError {
    signal: Signal,
    #[source]
    source: io::Error,
}

/// The signal that asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

async fn interrupt() -> Result<Signal, SignalError> {
    signal::ctrl_c()
        .await
        .map(|()| Signal::Interrupt)
        .map_err(|source| SignalError {
            signal: Signal::Interrupt,
            source,
        })
}

#[cfg(unix)]
async fn terminate() -> Result<Signal, SignalError> {
    use signal::unix::{SignalKind, signal};

    let mut stream = signal(SignalKind::terminate()).map_err(|source| SignalError {
        signal: Signal::Terminate,
        source,
    })?;

    stream.recv().await;

    Ok(Signal::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> Result<Signal, SignalError> {
    std::future::pending().await
}

/// Resolve on the first SIGINT or SIGTERM.
pub(crate) async fn wait_for_signal() -> Result<Signal, SignalError> {
    tokio::select! {
        signal = interrupt() => signal,
        signal = terminate() => signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_display_their_posix_names() {
        assert_eq!(Signal::Interrupt.to_string(), "SIGINT");
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
    }
}
