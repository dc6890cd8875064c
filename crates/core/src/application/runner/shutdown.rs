// Stop signal shared between the host and its poll runners

use tokio::sync::watch;

/// Receiving side, one per runner
#[derive(Clone)]
pub struct ShutdownToken {
    stop: watch::Receiver<bool>,
}

impl ShutdownToken {
    pub fn is_shutdown(&self) -> bool {
        *self.stop.borrow()
    }

    /// Resolve once stop was requested or the sender is gone
    pub async fn wait(&mut self) {
        let _ = self.stop.wait_for(|stop| *stop).await;
    }
}

/// Host side of the stop signal
pub struct ShutdownSender {
    stop: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Ask every runner to finish its current cycle and stop
    pub fn shutdown(&self) {
        self.stop.send_replace(true);
    }

    /// Token for an additional runner
    pub fn subscribe(&self) -> ShutdownToken {
        ShutdownToken {
            stop: self.stop.subscribe(),
        }
    }
}

pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (stop, rx) = watch::channel(false);
    (ShutdownSender { stop }, ShutdownToken { stop: rx })
}
