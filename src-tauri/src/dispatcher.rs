use tokio::sync::mpsc;

use crate::{
    popup::{PopupHost, PopupSurface},
    truncate_message, RelayedMessage, UnreadCounter,
};

/// Inputs of the dispatcher. Everything that touches notification state is
/// funnelled through this queue and handled one event at a time.
#[derive(Debug)]
pub(crate) enum HostEvent {
    Relayed(String),
    FocusReset,
    PopupReady(u64),
    PopupCloseRequested(u64),
    PopupDestroyed(u64),
    PopupAutoDismiss(u64),
}

/// A side effect driven by relayed messages.
pub(crate) trait NotificationSink: Send {
    fn name(&self) -> &'static str;
    fn deliver(&mut self, message: &RelayedMessage, unread: u64);
    /// Drop transient state and restore the baseline visuals.
    fn reset(&mut self) {}
}

pub(crate) struct NotificationDispatcher<P: PopupHost> {
    unread: UnreadCounter,
    sinks: Vec<Box<dyn NotificationSink>>,
    popup: Option<PopupSurface<P>>,
}

impl<P: PopupHost> NotificationDispatcher<P> {
    pub(crate) fn new(sinks: Vec<Box<dyn NotificationSink>>, popup: Option<PopupSurface<P>>) -> Self {
        Self {
            unread: UnreadCounter::default(),
            sinks,
            popup,
        }
    }

    #[cfg(test)]
    pub(crate) fn unread(&self) -> u64 {
        self.unread.get()
    }

    pub(crate) fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Relayed(serialized) => self.on_relayed_message(&serialized),
            HostEvent::FocusReset => self.focus_reset(),
            HostEvent::PopupReady(generation) => {
                if let Some(popup) = self.popup.as_mut() {
                    popup.ready(generation);
                }
            }
            HostEvent::PopupCloseRequested(generation) => {
                if let Some(popup) = self.popup.as_mut() {
                    popup.request_close(generation);
                }
            }
            HostEvent::PopupDestroyed(generation) => {
                if let Some(popup) = self.popup.as_mut() {
                    popup.destroyed(generation);
                }
            }
            HostEvent::PopupAutoDismiss(generation) => {
                if let Some(popup) = self.popup.as_mut() {
                    popup.auto_dismiss(generation);
                }
            }
        }
    }

    pub(crate) fn on_relayed_message(&mut self, serialized: &str) {
        let message = match RelayedMessage::from_wire(serialized) {
            Ok(message) => message,
            Err(error) => {
                log::warn!(
                    "dropping relayed message: {error} payload={}",
                    truncate_message(serialized, 140)
                );
                return;
            }
        };

        let unread = self.unread.increment();
        log::info!("new message from {} (unread={unread})", message.sender);
        for sink in &mut self.sinks {
            log::debug!("delivering to sink {}", sink.name());
            sink.deliver(&message, unread);
        }
        if let Some(popup) = self.popup.as_mut() {
            popup.deliver(&message);
        }
    }

    /// The main window gained focus: everything unread counts as seen.
    pub(crate) fn focus_reset(&mut self) {
        if self.unread.get() > 0 {
            log::debug!("focus reset clears {} unread", self.unread.get());
        }
        self.unread.reset();
        for sink in &mut self.sinks {
            sink.reset();
        }
    }
}

pub(crate) async fn run_dispatcher<P: PopupHost>(
    mut rx: mpsc::UnboundedReceiver<HostEvent>,
    mut dispatcher: NotificationDispatcher<P>,
) {
    log::debug!("dispatcher started");
    while let Some(event) = rx.recv().await {
        dispatcher.handle(event);
    }
    log::debug!("dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::tests::FakePopupHost;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Journal {
        delivered: Vec<(String, u64)>,
        resets: u32,
    }

    struct RecordingSink(Arc<Mutex<Journal>>);

    impl NotificationSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn deliver(&mut self, message: &RelayedMessage, unread: u64) {
            self.0
                .lock()
                .unwrap()
                .delivered
                .push((message.content.clone(), unread));
        }

        fn reset(&mut self) {
            self.0.lock().unwrap().resets += 1;
        }
    }

    fn dispatcher(
        with_popup: bool,
    ) -> (NotificationDispatcher<FakePopupHost>, Arc<Mutex<Journal>>) {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let sinks: Vec<Box<dyn NotificationSink>> = vec![Box::new(RecordingSink(journal.clone()))];
        let popup = with_popup.then(|| PopupSurface::new(FakePopupHost::default(), None));
        (NotificationDispatcher::new(sinks, popup), journal)
    }

    #[test]
    fn each_relayed_message_counts_once_and_reaches_sinks() {
        let (mut dispatcher, journal) = dispatcher(false);
        dispatcher.handle(HostEvent::Relayed(r#"{"sender":"Alice","content":"hi"}"#.into()));
        dispatcher.handle(HostEvent::Relayed(r#"{"content":"again"}"#.into()));

        assert_eq!(dispatcher.unread(), 2);
        let journal = journal.lock().unwrap();
        assert_eq!(
            journal.delivered,
            [("hi".to_string(), 1), ("again".to_string(), 2)]
        );
    }

    #[test]
    fn malformed_payloads_leave_counter_unchanged() {
        let (mut dispatcher, journal) = dispatcher(false);
        dispatcher.on_relayed_message("{oops");
        dispatcher.on_relayed_message(r#"{"sender":"Alice","content":""}"#);
        dispatcher.on_relayed_message("[]");

        assert_eq!(dispatcher.unread(), 0);
        assert!(journal.lock().unwrap().delivered.is_empty());
    }

    #[test]
    fn focus_reset_zeroes_counter_and_resets_every_sink() {
        let (mut dispatcher, journal) = dispatcher(false);
        for _ in 0..3 {
            dispatcher.on_relayed_message(r#"{"content":"x"}"#);
        }
        dispatcher.handle(HostEvent::FocusReset);
        assert_eq!(dispatcher.unread(), 0);
        dispatcher.handle(HostEvent::FocusReset);
        assert_eq!(dispatcher.unread(), 0);
        assert_eq!(journal.lock().unwrap().resets, 2);

        dispatcher.on_relayed_message(r#"{"content":"y"}"#);
        assert_eq!(dispatcher.unread(), 1);
    }

    #[test]
    fn popup_receives_every_message_in_one_instance() {
        let (mut dispatcher, _) = dispatcher(true);
        for index in 0..4 {
            dispatcher.on_relayed_message(&format!(r#"{{"content":"m{index}"}}"#));
        }
        dispatcher.handle(HostEvent::PopupReady(1));
        let popup = dispatcher.popup.as_ref().unwrap();
        assert_eq!(popup.live_generation(), Some(1));

        dispatcher.handle(HostEvent::PopupCloseRequested(1));
        dispatcher.handle(HostEvent::PopupDestroyed(1));
        dispatcher.handle(HostEvent::PopupAutoDismiss(1));
        dispatcher.on_relayed_message(r#"{"content":"after close"}"#);
        assert_eq!(dispatcher.popup.as_ref().unwrap().live_generation(), Some(2));
    }

    #[tokio::test]
    async fn run_loop_drains_queue_in_order() {
        let (dispatcher, journal) = dispatcher(false);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(HostEvent::Relayed(r#"{"content":"one"}"#.into())).unwrap();
        tx.send(HostEvent::FocusReset).unwrap();
        tx.send(HostEvent::Relayed(r#"{"content":"two"}"#.into())).unwrap();
        drop(tx);

        run_dispatcher(rx, dispatcher).await;

        let journal = journal.lock().unwrap();
        assert_eq!(
            journal.delivered,
            [("one".to_string(), 1), ("two".to_string(), 1)]
        );
        assert_eq!(journal.resets, 1);
    }
}
