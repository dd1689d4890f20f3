//! Graceful shutdown for the node's long-running tasks.
//!
//! A `watch` channel carries one flag; every task holds a [`ShutdownSignal`]
//! and finishes when it flips.

use tokio::signal;
use tokio::sync::watch;

pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

/// A cloneable handle that resolves once shutdown is requested.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub async fn wait(mut self) {
        // A dropped controller also counts as shutdown.
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    /// Wait for SIGINT or SIGTERM, then trigger shutdown.
    pub async fn wait_for_signal(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            tokio::select! {
                r = signal::ctrl_c() => { r?; tracing::info!("received SIGINT, shutting down"); }
                _ = terminate.recv() => { tracing::info!("received SIGTERM, shutting down"); }
            }
        }
        #[cfg(not(unix))]
        {
            signal::ctrl_c().await?;
            tracing::info!("received Ctrl+C, shutting down");
        }
        self.shutdown();
        Ok(())
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_releases_every_signal() {
        let controller = ShutdownController::new();
        let a = controller.signal();
        let b = controller.signal();
        controller.shutdown();
        a.wait().await;
        b.wait().await;
    }

    #[tokio::test]
    async fn signal_taken_after_shutdown_resolves() {
        let controller = ShutdownController::new();
        controller.shutdown();
        controller.signal().wait().await;
    }
}
