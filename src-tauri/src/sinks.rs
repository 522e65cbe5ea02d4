use std::time::Duration;

use tauri::image::Image;
use tauri::{AppHandle, Emitter, Manager, WebviewUrl};
use tokio::sync::mpsc;

use crate::{
    badge::{BadgeCompositor, RgbaFrame},
    dispatcher::{HostEvent, NotificationSink},
    flash::{run_flash_loop, FlashFrame, FlashIndicator},
    notifications::SystemNotificationSink,
    popup::{PopupHost, PopupSurface},
    settings::StoredSettings,
    timer::StopHandle,
    ui_shell::{popup_label, set_tray_frame, set_tray_tooltip},
    RelayedMessage, BADGE_ACCENT_RGBA, BADGE_MARKER_RGBA, MAIN_WINDOW_LABEL, TRAY_TOOLTIP,
    UPDATE_MESSAGE_EVENT,
};

fn spawn_flash_timer(app: AppHandle, interval: Duration) -> StopHandle {
    let (handle, stop_rx) = StopHandle::new();
    tauri::async_runtime::spawn(run_flash_loop(interval, stop_rx, move |frame| {
        set_tray_frame(&app, frame)
    }));
    handle
}

/// Flashes the tray icon until the chat window is focused and keeps the
/// unread count in the tray tooltip.
pub(crate) struct TrayFlashSink {
    app: AppHandle,
    interval: Duration,
    indicator: FlashIndicator<StopHandle>,
}

impl TrayFlashSink {
    pub(crate) fn new(app: AppHandle, interval: Duration) -> Self {
        Self {
            app,
            interval,
            indicator: FlashIndicator::default(),
        }
    }
}

impl NotificationSink for TrayFlashSink {
    fn name(&self) -> &'static str {
        "tray-flash"
    }

    fn deliver(&mut self, _message: &RelayedMessage, unread: u64) {
        let app = self.app.clone();
        let interval = self.interval;
        if self.indicator.start(|| spawn_flash_timer(app, interval)) {
            log::debug!("tray flashing started");
        }
        let noun = if unread == 1 { "message" } else { "messages" };
        set_tray_tooltip(&self.app, &format!("{TRAY_TOOLTIP}: {unread} new {noun}"));
    }

    fn reset(&mut self) {
        // A stopped timer restores the baseline icon itself.
        if self.indicator.stop() {
            log::debug!("tray flashing stopped");
        } else {
            set_tray_frame(&self.app, FlashFrame::Baseline);
        }
        set_tray_tooltip(&self.app, TRAY_TOOLTIP);
    }
}

/// Swaps the chat window icon for the accented badge while messages are unread.
pub(crate) struct BadgeOverlaySink {
    app: AppHandle,
    compositor: BadgeCompositor,
}

impl BadgeOverlaySink {
    pub(crate) fn from_default_icon(app: AppHandle) -> Option<Self> {
        let icon = app.default_window_icon()?;
        let base = RgbaFrame::new(icon.width(), icon.height(), icon.rgba().to_vec())
            .map_err(|error| log::warn!("badge overlay disabled: {error}"))
            .ok()?;
        Some(Self {
            app,
            compositor: BadgeCompositor::new(base, BADGE_ACCENT_RGBA, BADGE_MARKER_RGBA),
        })
    }

    fn apply(&self, frame: &RgbaFrame) {
        let Some(window) = self.app.get_webview_window(MAIN_WINDOW_LABEL) else {
            return;
        };
        let icon = Image::new_owned(frame.pixels.clone(), frame.width, frame.height);
        if let Err(error) = window.set_icon(icon) {
            log::debug!("failed to set window icon: {error}");
        }
    }
}

impl NotificationSink for BadgeOverlaySink {
    fn name(&self) -> &'static str {
        "badge-overlay"
    }

    fn deliver(&mut self, _message: &RelayedMessage, unread: u64) {
        let frame = self.compositor.render(unread).clone();
        self.apply(&frame);
    }

    fn reset(&mut self) {
        self.compositor.clear();
        let base = self.compositor.base().clone();
        self.apply(&base);
    }
}

/// Popup windows backed by `ui/popup.html`.
pub(crate) struct TauriPopupHost {
    app: AppHandle,
    host_tx: mpsc::UnboundedSender<HostEvent>,
}

impl TauriPopupHost {
    pub(crate) fn new(app: AppHandle, host_tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self { app, host_tx }
    }
}

impl PopupHost for TauriPopupHost {
    type DismissTimer = StopHandle;

    fn create(&mut self, generation: u64, initial: &RelayedMessage) -> Result<(), String> {
        let initial_json = initial
            .to_wire()
            .map_err(|error| format!("Failed to serialize popup content: {error}"))?;
        let script = format!("window.__INITIAL_MESSAGE__ = {initial_json};");

        tauri::WebviewWindowBuilder::new(
            &self.app,
            popup_label(generation),
            WebviewUrl::App("popup.html".into()),
        )
        .title("New message")
        .inner_size(300.0, 400.0)
        .position(100.0, 100.0)
        .resizable(true)
        .focused(true)
        .initialization_script(&script)
        .build()
        .map_err(|error| format!("Failed to build popup window: {error}"))?;
        Ok(())
    }

    fn reveal(&mut self, generation: u64) {
        if let Some(window) = self.app.get_webview_window(&popup_label(generation)) {
            let _ = window.show();
            let _ = window.set_focus();
        }
    }

    fn push(&mut self, generation: u64, message: &RelayedMessage) {
        let label = popup_label(generation);
        if let Err(error) = self.app.emit_to(label.as_str(), UPDATE_MESSAGE_EVENT, message) {
            log::warn!("failed to push message to {label}: {error}");
        }
    }

    fn close(&mut self, generation: u64) {
        if let Some(window) = self.app.get_webview_window(&popup_label(generation)) {
            let _ = window.destroy();
        }
    }

    fn schedule_dismiss(&mut self, generation: u64, after: Duration) -> StopHandle {
        let (handle, mut stop_rx) = StopHandle::new();
        let host_tx = self.host_tx.clone();
        tauri::async_runtime::spawn(async move {
            tokio::select! {
                _ = stop_rx.changed() => {
                    log::debug!("popup #{generation} dismiss timer cancelled");
                }
                _ = tokio::time::sleep(after) => {
                    let _ = host_tx.send(HostEvent::PopupAutoDismiss(generation));
                }
            }
        });
        handle
    }
}

/// Builds the sinks enabled in the settings.
pub(crate) fn build_sinks(
    app: &AppHandle,
    settings: &StoredSettings,
    host_tx: mpsc::UnboundedSender<HostEvent>,
) -> (Vec<Box<dyn NotificationSink>>, Option<PopupSurface<TauriPopupHost>>) {
    let mut sinks: Vec<Box<dyn NotificationSink>> = Vec::new();

    if settings.sinks.system_notification {
        sinks.push(Box::new(SystemNotificationSink::new(app.clone())));
    }
    if settings.sinks.flashing_indicator {
        sinks.push(Box::new(TrayFlashSink::new(
            app.clone(),
            settings.flash_interval(),
        )));
    }
    if settings.sinks.badge_overlay {
        match BadgeOverlaySink::from_default_icon(app.clone()) {
            Some(sink) => sinks.push(Box::new(sink)),
            None => log::warn!("no default window icon; badge overlay disabled"),
        }
    }

    let popup = settings.sinks.popup.then(|| {
        PopupSurface::new(
            TauriPopupHost::new(app.clone(), host_tx),
            settings.popup_dismiss_after(),
        )
    });

    log::info!(
        "notification sinks: {:?}, popup={}",
        sinks.iter().map(|sink| sink.name()).collect::<Vec<_>>(),
        popup.is_some()
    );
    (sinks, popup)
}
