use std::thread;

#[cfg(target_os = "macos")]
use mac_notification_sys::{MainButton, Notification, NotificationResponse};
use tauri::AppHandle;

use crate::{
    dispatcher::NotificationSink, truncate_message, RelayedMessage, NOTIFICATION_BODY_MAX_CHARS,
    NOTIFICATION_TITLE,
};
#[cfg(all(unix, not(target_os = "macos")))]
use crate::TRAY_TOOLTIP;

/// One-shot OS notification per message; clicking it brings the chat window
/// back to the foreground.
pub(crate) struct SystemNotificationSink {
    app: AppHandle,
}

impl SystemNotificationSink {
    pub(crate) fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl NotificationSink for SystemNotificationSink {
    fn name(&self) -> &'static str {
        "system-notification"
    }

    fn deliver(&mut self, message: &RelayedMessage, _unread: u64) {
        send_system_notification(self.app.clone(), message.clone());
    }
}

fn notification_body(message: &RelayedMessage) -> String {
    truncate_message(&message.content, NOTIFICATION_BODY_MAX_CHARS)
}

#[cfg(target_os = "macos")]
fn send_system_notification(app: AppHandle, message: RelayedMessage) {
    thread::spawn(move || {
        ensure_macos_notification_application();
        let body = notification_body(&message);

        let mut notification = Notification::new();
        notification
            .title(NOTIFICATION_TITLE)
            .subtitle(&message.sender)
            .message(&body)
            .main_button(MainButton::SingleAction("Open"))
            .close_button("Dismiss")
            .default_sound()
            .wait_for_click(true)
            .asynchronous(false);

        match notification.send() {
            Ok(NotificationResponse::Click) | Ok(NotificationResponse::ActionButton(_)) => {
                crate::ui_shell::show_main_window(&app);
            }
            Ok(_) => {}
            Err(error) => {
                log::warn!("failed to show macOS notification: {error}");
            }
        }
    });
}

#[cfg(target_os = "macos")]
fn ensure_macos_notification_application() {
    static INIT_NOTIFICATION_APP: std::sync::Once = std::sync::Once::new();
    INIT_NOTIFICATION_APP.call_once(|| {
        for bundle_id in ["net.chatnotifier.desktop", "com.apple.Terminal"] {
            match mac_notification_sys::set_application(bundle_id) {
                Ok(_) => return,
                Err(error) => {
                    log::debug!("failed to set macOS notification bundle id {bundle_id}: {error}");
                }
            }
        }
    });
}

#[cfg(windows)]
fn send_system_notification(app: AppHandle, message: RelayedMessage) {
    use tauri::Manager as _;
    use tauri_winrt_notification::{Duration, Sound, Toast};

    thread::spawn(move || {
        // Unpackaged debug builds have no registered app id of their own.
        let app_id = if cfg!(debug_assertions) {
            Toast::POWERSHELL_APP_ID.to_string()
        } else {
            app.config().identifier.clone()
        };
        let body = notification_body(&message);
        let app_for_click = app.clone();

        let shown = Toast::new(&app_id)
            .title(NOTIFICATION_TITLE)
            .text1(&message.sender)
            .text2(&body)
            .sound(Some(Sound::Default))
            .duration(Duration::Short)
            .on_activated(move |_action| {
                crate::ui_shell::show_main_window(&app_for_click);
                Ok(())
            })
            .show();
        if let Err(error) = shown {
            log::warn!("failed to show Windows toast: {error}");
        }
    });
}

#[cfg(all(unix, not(target_os = "macos")))]
fn send_system_notification(app: AppHandle, message: RelayedMessage) {
    thread::spawn(move || {
        let body = format!("{}: {}", message.sender, notification_body(&message));
        let mut notification = notify_rust::Notification::new();
        notification
            .summary(NOTIFICATION_TITLE)
            .body(&body)
            .appname(TRAY_TOOLTIP)
            .action("default", "Open");

        match notification.show() {
            Ok(handle) => handle.wait_for_action(|action| {
                if action == "default" {
                    crate::ui_shell::show_main_window(&app);
                }
            }),
            Err(error) => log::warn!("failed to show notification: {error}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_truncated_for_long_messages() {
        let message = RelayedMessage::new(None, Some("x".repeat(300))).unwrap();
        let body = notification_body(&message);
        assert_eq!(body.chars().count(), NOTIFICATION_BODY_MAX_CHARS + 3);
        assert!(body.ends_with("..."));
    }
}
