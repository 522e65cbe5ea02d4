#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod badge;
mod bridge;
mod consts;
mod core;
mod dispatcher;
mod error;
mod flash;
mod model;
mod notifications;
mod popup;
mod settings;
mod sinks;
mod timer;
mod ui_shell;

pub(crate) use crate::core::{restrict_file_permissions, settings_file, truncate_message};
pub(crate) use consts::*;
pub(crate) use model::{AppState, RelayedMessage, UnreadCounter};

use tauri::menu::{Menu, MenuItem};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
use tauri::webview::PageLoadEvent;
use tauri::{Manager, State, WebviewUrl};
use tauri_plugin_log::{Target, TargetKind};
use tokio::sync::mpsc;

use crate::{
    bridge::{BridgeContract, PageRelayConfig, PAGE_RELAY_SCRIPT},
    dispatcher::{run_dispatcher, HostEvent, NotificationDispatcher},
    flash::FlashFrame,
    settings::{load_or_init_settings, normalize_chat_url, subscription_prefix, StoredSettings},
    ui_shell::{popup_generation, post_host_event, show_main_window, tray_icon_for_frame},
};

/// The chat page's only way into the host.
#[tauri::command]
fn send_new_message(webview: tauri::Webview, state: State<'_, AppState>, serialized: String) {
    if webview.label() != MAIN_WINDOW_LABEL {
        log::warn!("send_new_message from {} ignored", webview.label());
        return;
    }
    state.bridge.send_new_message(serialized);
}

#[tauri::command]
fn popup_ready(window: tauri::Window) {
    if let Some(generation) = popup_generation(window.label()) {
        post_host_event(window.app_handle(), HostEvent::PopupReady(generation));
    }
}

#[tauri::command]
fn close_popup(window: tauri::Window) {
    if let Some(generation) = popup_generation(window.label()) {
        post_host_event(window.app_handle(), HostEvent::PopupCloseRequested(generation));
    }
}

fn log_plugin() -> tauri::plugin::TauriPlugin<tauri::Wry> {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    tauri_plugin_log::Builder::default()
        .clear_targets()
        .targets([
            Target::new(TargetKind::Stdout),
            Target::new(TargetKind::LogDir { file_name: None }),
        ])
        .level(level)
        .build()
}

fn main() {
    let (host_tx, host_rx) = mpsc::unbounded_channel::<HostEvent>();

    tauri::Builder::default()
        .plugin(log_plugin())
        .invoke_handler(tauri::generate_handler![send_new_message, popup_ready, close_popup])
        .setup(move |app| {
            log::info!("chat-notifier starting (pid={})", std::process::id());

            let startup_settings = load_or_init_settings(app.handle()).unwrap_or_else(|error| {
                log::warn!("{error}; continuing with default settings");
                StoredSettings::default()
            });
            let chat_url = normalize_chat_url(&startup_settings.chat_url)?;
            let prefix = subscription_prefix(&chat_url)?;
            log::info!("chat page {chat_url}, subscription endpoint {prefix}");

            let page_config = PageRelayConfig::new(prefix).to_script()?;
            app.manage(AppState::new(host_tx.clone()));

            let (sinks, popup) = sinks::build_sinks(app.handle(), &startup_settings, host_tx);
            tauri::async_runtime::spawn(run_dispatcher(
                host_rx,
                NotificationDispatcher::new(sinks, popup),
            ));

            tauri::WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, WebviewUrl::External(chat_url))
                .title(TRAY_TOOLTIP)
                .inner_size(1100.0, 780.0)
                .min_inner_size(480.0, 360.0)
                .visible(!startup_settings.start_minimized_to_tray)
                .initialization_script(&page_config)
                .initialization_script(PAGE_RELAY_SCRIPT)
                .build()?;

            let open_item = MenuItem::with_id(app, "open", "Open", true, None::<&str>)?;
            let quit_item = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;
            let menu = Menu::with_items(app, &[&open_item, &quit_item])?;

            let mut tray_builder = TrayIconBuilder::with_id(MAIN_TRAY_ID)
                .tooltip(TRAY_TOOLTIP)
                .menu(&menu)
                .show_menu_on_left_click(false)
                .on_tray_icon_event(|tray, event| match event {
                    TrayIconEvent::Click {
                        button: MouseButton::Left,
                        button_state: MouseButtonState::Up,
                        ..
                    }
                    | TrayIconEvent::DoubleClick {
                        button: MouseButton::Left,
                        ..
                    } => show_main_window(tray.app_handle()),
                    _ => {}
                })
                .on_menu_event(|app, event| match event.id().as_ref() {
                    "open" => show_main_window(app),
                    "quit" => app.exit(0),
                    _ => {}
                });
            if let Some(icon) = tray_icon_for_frame(FlashFrame::Baseline)
                .or_else(|| app.default_window_icon().cloned())
            {
                tray_builder = tray_builder.icon(icon);
            }
            tray_builder.build(app)?;

            log::debug!("setup complete");
            Ok(())
        })
        .on_page_load(|webview, payload| {
            if webview.label() == MAIN_WINDOW_LABEL && matches!(payload.event(), PageLoadEvent::Finished) {
                log::info!("chat page loaded: {}", payload.url().path());
            }
        })
        .on_window_event(|window, event| ui_shell::handle_window_event(window, event))
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
