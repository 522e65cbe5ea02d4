pub(crate) const DEFAULT_CHAT_URL: &str = "https://woa.wps.cn/im/messages#/";
pub(crate) const SUBSCRIPTION_PATH: &str = "/sub";
pub(crate) const TOKEN_QUERY_PARAM: &str = "req_id";
pub(crate) const NEW_MESSAGE_KIND: &str = "new_message";
pub(crate) const UNKNOWN_SENDER: &str = "unknown";

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const POPUP_LABEL_PREFIX: &str = "popup-";
pub(crate) const MAIN_TRAY_ID: &str = "main-tray";
pub(crate) const TRAY_TOOLTIP: &str = "Chat Notifier";
pub(crate) const UPDATE_MESSAGE_EVENT: &str = "update-message";

pub(crate) const NOTIFICATION_TITLE: &str = "New message";
pub(crate) const NOTIFICATION_BODY_MAX_CHARS: usize = 220;

pub(crate) const DEFAULT_FLASH_INTERVAL_MS: u64 = 500;
pub(crate) const MIN_FLASH_INTERVAL_MS: u64 = 100;
pub(crate) const MAX_FLASH_INTERVAL_MS: u64 = 5_000;
pub(crate) const POPUP_AUTO_DISMISS_MS: u64 = 5_000;

pub(crate) const BADGE_ACCENT_RGBA: [u8; 4] = [0xc0, 0x63, 0x25, 0xff];
pub(crate) const BADGE_MARKER_RGBA: [u8; 4] = [0xe0, 0x1b, 0x24, 0xff];
