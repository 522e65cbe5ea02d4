use std::time::Duration;

use crate::{timer::Cancel, RelayedMessage};

/// Platform side of the popup: window creation, content push and teardown.
/// Each instance is identified by a generation number.
pub(crate) trait PopupHost {
    type DismissTimer: Cancel;

    /// Creates the window with `initial` already rendered.
    fn create(&mut self, generation: u64, initial: &RelayedMessage) -> Result<(), String>;
    fn reveal(&mut self, generation: u64);
    fn push(&mut self, generation: u64, message: &RelayedMessage);
    fn close(&mut self, generation: u64);
    fn schedule_dismiss(&mut self, generation: u64, after: Duration) -> Self::DismissTimer;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PopupDelivery {
    Created(u64),
    Reused(u64),
    Failed,
}

struct LivePopup<T> {
    generation: u64,
    /// Set once the popup page listens for pushes. Until then pushes queue up.
    ready: bool,
    pending: Vec<RelayedMessage>,
    dismiss: Option<T>,
}

/// Keeps at most one live popup and routes new messages into it.
pub(crate) struct PopupSurface<H: PopupHost> {
    host: H,
    live: Option<LivePopup<H::DismissTimer>>,
    next_generation: u64,
    auto_dismiss: Option<Duration>,
}

impl<H: PopupHost> PopupSurface<H> {
    pub(crate) fn new(host: H, auto_dismiss: Option<Duration>) -> Self {
        Self {
            host,
            live: None,
            next_generation: 1,
            auto_dismiss,
        }
    }

    #[cfg(test)]
    pub(crate) fn live_generation(&self) -> Option<u64> {
        self.live.as_ref().map(|live| live.generation)
    }

    pub(crate) fn deliver(&mut self, message: &RelayedMessage) -> PopupDelivery {
        if let Some(live) = self.live.as_mut() {
            let generation = live.generation;
            self.host.reveal(generation);
            if live.ready {
                self.host.push(generation, message);
            } else {
                live.pending.push(message.clone());
            }
            return PopupDelivery::Reused(generation);
        }

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        if let Err(error) = self.host.create(generation, message) {
            log::error!("failed to create popup #{generation}: {error}");
            return PopupDelivery::Failed;
        }
        log::debug!("popup #{generation} created");
        let dismiss = self
            .auto_dismiss
            .map(|after| self.host.schedule_dismiss(generation, after));
        self.live = Some(LivePopup {
            generation,
            ready: false,
            pending: Vec::new(),
            dismiss,
        });
        PopupDelivery::Created(generation)
    }

    /// The popup page is listening; flush whatever arrived while it loaded.
    pub(crate) fn ready(&mut self, generation: u64) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        if live.generation != generation || live.ready {
            return;
        }
        live.ready = true;
        for message in live.pending.drain(..) {
            self.host.push(generation, &message);
        }
    }

    /// The popup page asked to close itself.
    pub(crate) fn request_close(&mut self, generation: u64) {
        if self.take_live(generation) {
            self.host.close(generation);
        }
    }

    pub(crate) fn auto_dismiss(&mut self, generation: u64) {
        if self.take_live(generation) {
            log::debug!("popup #{generation} auto-dismissed");
            self.host.close(generation);
        }
    }

    /// The window is gone (user closed it or it was destroyed by us).
    pub(crate) fn destroyed(&mut self, generation: u64) {
        self.take_live(generation);
    }

    fn take_live(&mut self, generation: u64) -> bool {
        if self.live.as_ref().map(|live| live.generation) != Some(generation) {
            return false;
        }
        if let Some(timer) = self.live.take().and_then(|live| live.dismiss) {
            timer.cancel();
        }
        true
    }
}
