//! Shutdown signalling.
//!
//! SIGTERM and SIGINT (Ctrl+C elsewhere) flip a watch channel that the HTTP
//! server awaits for graceful shutdown. Tests and embedders can flip it by
//! hand through a [`ShutdownHandle`].

use tokio::sync::watch;
use tracing::{error, info};

/// Owns the shutdown channel and the OS signal listener.
pub struct SignalHandler {
    tx: watch::Sender<bool>,
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalHandler {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Spawns the task translating OS signals into a shutdown.
    #[cfg(unix)]
    pub fn spawn_listener(&self) {
        let handle = self.handle();

        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        error!(error = %e, "failed to install signal handlers");
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("received SIGINT, shutting down"),
            }
            handle.trigger();
        });
    }

    #[cfg(not(unix))]
    pub fn spawn_listener(&self) {
        let handle = self.handle();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received Ctrl+C, shutting down");
                handle.trigger();
            }
        });
    }

    /// Returns a handle that can trigger or await the shutdown.
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Cloneable trigger/waiter for the shutdown channel.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once shutdown has been triggered.
    pub async fn wait(self) {
        let mut rx = self.tx.subscribe();
        // Errors only if every sender is gone, which cannot happen while
        // `self` holds one.
        let _ = rx.wait_for(|shutdown| *shutdown).await;
    }
}
