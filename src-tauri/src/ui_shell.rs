use tauri::image::Image;
use tauri::{AppHandle, Manager, Runtime, WindowEvent};

use crate::{
    dispatcher::HostEvent, flash::FlashFrame, AppState, MAIN_TRAY_ID, MAIN_WINDOW_LABEL,
    POPUP_LABEL_PREFIX,
};

pub(crate) fn show_main_window<R: Runtime>(app: &AppHandle<R>) {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
        let _ = window.show();
        let _ = window.unminimize();
        let _ = window.set_focus();
    }
}

pub(crate) fn popup_label(generation: u64) -> String {
    format!("{POPUP_LABEL_PREFIX}{generation}")
}

pub(crate) fn popup_generation(label: &str) -> Option<u64> {
    label.strip_prefix(POPUP_LABEL_PREFIX)?.parse().ok()
}

pub(crate) fn handle_window_event<R: Runtime>(window: &tauri::Window<R>, event: &WindowEvent) {
    if window.label() == MAIN_WINDOW_LABEL {
        match event {
            WindowEvent::CloseRequested { api, .. } => {
                api.prevent_close();
                let _ = window.hide();
            }
            WindowEvent::Focused(true) => post_host_event(window.app_handle(), HostEvent::FocusReset),
            _ => {}
        }
        return;
    }

    if let Some(generation) = popup_generation(window.label()) {
        if let WindowEvent::Destroyed = event {
            post_host_event(window.app_handle(), HostEvent::PopupDestroyed(generation));
        }
    }
}

pub(crate) fn post_host_event<R: Runtime>(app: &AppHandle<R>, event: HostEvent) {
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };
    if state.host_tx.send(event).is_err() {
        log::warn!("dispatcher queue closed; host event dropped");
    }
}

pub(crate) fn tray_icon_for_frame(frame: FlashFrame) -> Option<Image<'static>> {
    let bytes = match frame {
        FlashFrame::Alert => include_bytes!("../icons/tray-alert.png").as_slice(),
        FlashFrame::Baseline => include_bytes!("../icons/tray-idle.png").as_slice(),
    };
    Image::from_bytes(bytes).ok().map(|icon| icon.to_owned())
}

pub(crate) fn set_tray_frame<R: Runtime>(app: &AppHandle<R>, frame: FlashFrame) {
    if let Some(tray) = app.tray_by_id(MAIN_TRAY_ID) {
        if let Err(error) = tray.set_icon(tray_icon_for_frame(frame)) {
            log::debug!("failed to set tray icon: {error}");
        }
    }
}

pub(crate) fn set_tray_tooltip<R: Runtime>(app: &AppHandle<R>, tooltip: &str) {
    if let Some(tray) = app.tray_by_id(MAIN_TRAY_ID) {
        let _ = tray.set_tooltip(Some(tooltip));
    }
}
