use serde::{Deserialize, Serialize};
use std::{fs, time::Duration};
use tauri::{AppHandle, Runtime};

use crate::{
    restrict_file_permissions, settings_file, DEFAULT_CHAT_URL, DEFAULT_FLASH_INTERVAL_MS,
    MAX_FLASH_INTERVAL_MS, MIN_FLASH_INTERVAL_MS, POPUP_AUTO_DISMISS_MS, SUBSCRIPTION_PATH,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct SinkSettings {
    pub(crate) system_notification: bool,
    pub(crate) flashing_indicator: bool,
    pub(crate) badge_overlay: bool,
    pub(crate) popup: bool,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            system_notification: true,
            flashing_indicator: true,
            badge_overlay: true,
            popup: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct StoredSettings {
    pub(crate) chat_url: String,
    pub(crate) sinks: SinkSettings,
    pub(crate) popup_auto_dismiss: bool,
    pub(crate) flash_interval_ms: u64,
    pub(crate) start_minimized_to_tray: bool,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            chat_url: DEFAULT_CHAT_URL.to_string(),
            sinks: SinkSettings::default(),
            popup_auto_dismiss: false,
            flash_interval_ms: DEFAULT_FLASH_INTERVAL_MS,
            start_minimized_to_tray: false,
        }
    }
}

impl StoredSettings {
    pub(crate) fn flash_interval(&self) -> Duration {
        Duration::from_millis(
            self.flash_interval_ms
                .clamp(MIN_FLASH_INTERVAL_MS, MAX_FLASH_INTERVAL_MS),
        )
    }

    pub(crate) fn popup_dismiss_after(&self) -> Option<Duration> {
        self.popup_auto_dismiss
            .then(|| Duration::from_millis(POPUP_AUTO_DISMISS_MS))
    }
}

pub(crate) fn read_settings<R: Runtime>(app: &AppHandle<R>) -> Result<StoredSettings, String> {
    let path = settings_file(app)?;
    if !path.exists() {
        return Ok(StoredSettings::default());
    }

    let content =
        fs::read_to_string(path).map_err(|error| format!("Failed to read settings: {error}"))?;
    serde_json::from_str::<StoredSettings>(&content)
        .map_err(|error| format!("Failed to parse settings: {error}"))
}

pub(crate) fn save_settings<R: Runtime>(
    app: &AppHandle<R>,
    settings: &StoredSettings,
) -> Result<(), String> {
    let path = settings_file(app)?;
    let content = serde_json::to_string_pretty(settings)
        .map_err(|error| format!("Failed to serialize settings: {error}"))?;
    fs::write(&path, content).map_err(|error| format!("Failed to write settings: {error}"))?;
    restrict_file_permissions(&path);
    Ok(())
}

/// Loads the settings, writing the defaults on first start so they can be
/// edited by hand.
pub(crate) fn load_or_init_settings<R: Runtime>(
    app: &AppHandle<R>,
) -> Result<StoredSettings, String> {
    let path = settings_file(app)?;
    if path.exists() {
        restrict_file_permissions(&path);
        return read_settings(app);
    }

    let defaults = StoredSettings::default();
    save_settings(app, &defaults)?;
    log::info!("wrote default settings to {path:?}");
    Ok(defaults)
}

pub(crate) fn normalize_chat_url(input: &str) -> Result<url::Url, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Chat URL is required".to_string());
    }

    let url = url::Url::parse(trimmed).map_err(|error| format!("Invalid chat URL: {error}"))?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err("Chat URL must start with http:// or https://".to_string());
    }
    if url.host_str().is_none() {
        return Err("Chat URL has no host".to_string());
    }

    Ok(url)
}

/// `https://host/anything` -> `wss://host/sub`.
pub(crate) fn subscription_prefix(chat_url: &url::Url) -> Result<String, String> {
    let mut ws_url = chat_url.clone();

    match ws_url.scheme() {
        "http" => {
            ws_url
                .set_scheme("ws")
                .map_err(|_| "Unable to convert URL scheme to ws".to_string())?;
        }
        "https" => {
            ws_url
                .set_scheme("wss")
                .map_err(|_| "Unable to convert URL scheme to wss".to_string())?;
        }
        _ => return Err("Chat URL must start with http:// or https://".to_string()),
    }

    ws_url.set_path(SUBSCRIPTION_PATH);
    ws_url.set_query(None);
    ws_url.set_fragment(None);
    Ok(ws_url.to_string())
}
