use tokio::sync::watch;

/// A running timer task that can be stopped.
pub(crate) trait Cancel {
    fn cancel(self);
}

/// Stop side of a spawned timer task. The task watches the paired receiver
/// and ends on `true` or when the handle is dropped.
pub(crate) struct StopHandle {
    stop_tx: watch::Sender<bool>,
}

impl StopHandle {
    pub(crate) fn new() -> (Self, watch::Receiver<bool>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        (Self { stop_tx }, stop_rx)
    }
}

impl Cancel for StopHandle {
    fn cancel(self) {
        let _ = self.stop_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_signals_the_receiver() {
        let (handle, stop_rx) = StopHandle::new();
        assert!(!*stop_rx.borrow());
        handle.cancel();
        assert!(*stop_rx.borrow());
    }

    #[tokio::test]
    async fn dropped_handle_ends_the_wait() {
        let (handle, mut stop_rx) = StopHandle::new();
        drop(handle);
        assert!(stop_rx.changed().await.is_err());
    }
}
