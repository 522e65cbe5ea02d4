use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{bridge::HostBridge, dispatcher::HostEvent, error::RelayError, UNKNOWN_SENDER};

pub(crate) struct AppState {
    pub(crate) host_tx: mpsc::UnboundedSender<HostEvent>,
    /// What the `send_new_message` command forwards to.
    pub(crate) bridge: HostBridge,
}

impl AppState {
    pub(crate) fn new(host_tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            bridge: HostBridge::new(host_tx.clone()),
            host_tx,
        }
    }
}

/// A new chat message as it crosses the bridge into the host.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub(crate) struct RelayedMessage {
    #[serde(default = "unknown_sender")]
    pub(crate) sender: String,
    #[serde(default)]
    pub(crate) content: String,
}

impl RelayedMessage {
    pub(crate) fn new(sender: Option<String>, content: Option<String>) -> Result<Self, RelayError> {
        let content = content.unwrap_or_default();
        if content.is_empty() {
            return Err(RelayError::EmptyContent);
        }
        let sender = sender
            .filter(|name| !name.is_empty())
            .unwrap_or_else(unknown_sender);
        Ok(Self { sender, content })
    }

    pub(crate) fn to_wire(&self) -> Result<String, RelayError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a relayed payload; the sender defaults and empty content is rejected.
    pub(crate) fn from_wire(serialized: &str) -> Result<Self, RelayError> {
        let parsed: RelayedMessage = serde_json::from_str(serialized)?;
        Self::new(Some(parsed.sender), Some(parsed.content))
    }
}

fn unknown_sender() -> String {
    UNKNOWN_SENDER.to_string()
}

/// Process-wide count of messages seen since the main window last had focus.
#[derive(Debug, Default)]
pub(crate) struct UnreadCounter(u64);

impl UnreadCounter {
    pub(crate) fn increment(&mut self) -> u64 {
        self.0 = self.0.saturating_add(1);
        self.0
    }

    pub(crate) fn reset(&mut self) {
        self.0 = 0;
    }

    pub(crate) fn get(&self) -> u64 {
        self.0
    }
}
