// Signal handling module
//
// - SIGINT  (Ctrl+C): graceful shutdown
// - SIGTERM (Unix):   graceful shutdown
//
// One listener task turns the first signal into one shutdown request.

use std::io;
use std::sync::Arc;
use tokio::sync::Notify;

/// Shutdown request shared between the signal task and the accept loop
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    notify: Notify,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. The permit is stored, so a request made while a
    /// connection is being served is seen once that connection finishes.
    pub fn trigger(&self) {
        self.notify.notify_one();
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Register the interrupt handlers and spawn the task that waits on them.
///
/// Registration happens before this returns, so Ctrl+C no longer kills the
/// process outright once the server has announced itself.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<ShutdownSignal>) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
        shutdown.trigger();
    });
    Ok(())
}

/// Windows fallback - only handles Ctrl+C
#[cfg(windows)]
pub fn start_signal_handler(shutdown: Arc<ShutdownSignal>) -> io::Result<()> {
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;

    tokio::spawn(async move {
        if ctrl_c.recv().await.is_some() {
            shutdown.trigger();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_before_wait_is_not_lost() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .expect("stored shutdown permit");
    }

    #[tokio::test]
    async fn test_wait_wakes_on_trigger() {
        let shutdown = Arc::new(ShutdownSignal::new());
        let trigger = Arc::clone(&shutdown);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });
        tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .expect("shutdown wakes waiter");
    }
}
