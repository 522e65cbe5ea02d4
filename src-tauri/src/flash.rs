use std::time::Duration;

use tokio::sync::watch;

use crate::timer::Cancel;

enum FlashPhase<T> {
    Idle,
    Flashing(T),
}

/// Alternating tray indicator. At most one timer runs at a time; starting
/// while flashing and stopping while idle are no-ops.
pub(crate) struct FlashIndicator<T: Cancel> {
    phase: FlashPhase<T>,
}

impl<T: Cancel> Default for FlashIndicator<T> {
    fn default() -> Self {
        Self {
            phase: FlashPhase::Idle,
        }
    }
}

impl<T: Cancel> FlashIndicator<T> {
    pub(crate) fn is_flashing(&self) -> bool {
        matches!(self.phase, FlashPhase::Flashing(_))
    }

    /// Calls `spawn` only on the Idle -> Flashing transition.
    pub(crate) fn start(&mut self, spawn: impl FnOnce() -> T) -> bool {
        if self.is_flashing() {
            return false;
        }
        self.phase = FlashPhase::Flashing(spawn());
        true
    }

    pub(crate) fn stop(&mut self) -> bool {
        match std::mem::replace(&mut self.phase, FlashPhase::Idle) {
            FlashPhase::Flashing(timer) => {
                timer.cancel();
                true
            }
            FlashPhase::Idle => false,
        }
    }
}

/// The two visual states a flashing indicator alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlashFrame {
    Alert,
    Baseline,
}

impl FlashFrame {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Alert => Self::Baseline,
            Self::Baseline => Self::Alert,
        }
    }
}

/// Toggles `apply` between the two frames every `interval` until stopped,
/// then leaves the indicator on the baseline frame. The baseline is written
/// by the loop itself so no toggle can land after it.
pub(crate) async fn run_flash_loop(
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
    mut apply: impl FnMut(FlashFrame),
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut frame = FlashFrame::Alert;
    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                apply(frame);
                frame = frame.toggled();
            }
        }
    }
    apply(FlashFrame::Baseline);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::StopHandle;
    use std::{
        cell::Cell,
        rc::Rc,
        sync::{Arc, Mutex},
    };

    struct CountingTimer(Rc<Cell<u32>>);

    impl Cancel for CountingTimer {
        fn cancel(self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn start_while_flashing_spawns_nothing() {
        let cancels = Rc::new(Cell::new(0));
        let mut spawned = 0;
        let mut indicator = FlashIndicator::default();

        for _ in 0..3 {
            indicator.start(|| {
                spawned += 1;
                CountingTimer(cancels.clone())
            });
        }
        assert_eq!(spawned, 1);
        assert!(indicator.is_flashing());
    }

    #[test]
    fn stop_cancels_once_and_is_idempotent() {
        let cancels = Rc::new(Cell::new(0));
        let mut indicator = FlashIndicator::default();
        indicator.start(|| CountingTimer(cancels.clone()));

        assert!(indicator.stop());
        assert!(!indicator.stop());
        assert_eq!(cancels.get(), 1);
        assert!(!indicator.is_flashing());

        assert!(indicator.start(|| CountingTimer(cancels.clone())));
    }

    #[test]
    fn frames_alternate() {
        let frame = FlashFrame::Alert;
        assert_eq!(frame.toggled(), FlashFrame::Baseline);
        assert_eq!(frame.toggled().toggled(), FlashFrame::Alert);
    }

    #[tokio::test]
    async fn flash_loop_alternates_and_finishes_on_baseline() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let recorded = frames.clone();
        let (handle, stop_rx) = StopHandle::new();
        let task = tokio::spawn(run_flash_loop(
            Duration::from_millis(5),
            stop_rx,
            move |frame| recorded.lock().unwrap().push(frame),
        ));

        tokio::time::sleep(Duration::from_millis(40)).await;
        handle.cancel();
        task.await.unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.first(), Some(&FlashFrame::Alert));
        assert_eq!(frames.last(), Some(&FlashFrame::Baseline));
        assert!(frames.len() >= 2);
    }

    #[tokio::test]
    async fn stop_before_first_tick_still_restores_baseline() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let recorded = frames.clone();
        let (handle, stop_rx) = StopHandle::new();
        handle.cancel();

        run_flash_loop(Duration::from_millis(5), stop_rx, move |frame| {
            recorded.lock().unwrap().push(frame)
        })
        .await;

        assert_eq!(*frames.lock().unwrap(), [FlashFrame::Baseline]);
    }
}
