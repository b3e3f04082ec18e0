//! Process shutdown signals
//!
//! The listener has no natural end, so SIGINT and SIGTERM are the normal ways
//! out. Both are handled so that `main` returns and buffered log output is
//! flushed.

use std::fmt;
use tokio::signal;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => f.write_str("SIGINT"),
            ShutdownSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Signal listeners. The SIGTERM handler is registered in [`install`], so a
/// SIGTERM arriving any time after that is queued instead of killing the
/// process. Must be called inside a tokio runtime.
///
/// [`install`]: ShutdownSignals::install
pub struct ShutdownSignals {
    #[cfg(unix)]
    terminate: Option<signal::unix::Signal>,
}

impl ShutdownSignals {
    pub fn install() -> Self {
        #[cfg(unix)]
        let terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                None
            }
        };

        Self {
            #[cfg(unix)]
            terminate,
        }
    }

    /// Wait for the first of SIGINT (Ctrl-C) or SIGTERM
    pub async fn recv(&mut self) -> ShutdownSignal {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match self.terminate.as_mut() {
                Some(sig) => {
                    sig.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => ShutdownSignal::Interrupt,
            () = terminate => ShutdownSignal::Terminate,
        }
    }
}
