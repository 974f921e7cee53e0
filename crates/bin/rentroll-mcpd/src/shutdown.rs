//! Process shutdown signals.

use std::io;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Waits for SIGINT or, on unix, SIGTERM.
///
/// Handlers are registered by [`ShutdownSignal::install`], so a SIGTERM that
/// arrives before [`ShutdownSignal::recv`] is polled is still observed.
#[derive(Debug)]
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: Signal,
}

impl ShutdownSignal {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Resolves with the name of the first signal received.
    pub async fn recv(self) -> io::Result<&'static str> {
        #[cfg(unix)]
        {
            let mut terminate = self.terminate;
            tokio::select! {
                result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
                _ = terminate.recv() => Ok("SIGTERM"),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.map(|()| "SIGINT")
        }
    }
}
