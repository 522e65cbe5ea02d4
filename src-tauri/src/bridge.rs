use serde::Serialize;
use tokio::sync::mpsc;

use crate::{dispatcher::HostEvent, NEW_MESSAGE_KIND, TOKEN_QUERY_PARAM, UNKNOWN_SENDER};

/// Page-side module loaded before any chat page script runs. It extracts the
/// session token from the page's own subscription attempts, opens the
/// listening channel inside the page once the page has loaded, and relays
/// each new message through `send_new_message`.
pub(crate) const PAGE_RELAY_SCRIPT: &str = include_str!("../bridge/page_relay.js");

/// The only host capability the chat page gets. Fire-and-forget.
pub(crate) trait BridgeContract {
    fn send_new_message(&self, serialized: String);
}

#[derive(Clone)]
pub(crate) struct HostBridge {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl HostBridge {
    pub(crate) fn new(tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self { tx }
    }
}

impl BridgeContract for HostBridge {
    fn send_new_message(&self, serialized: String) {
        if self.tx.send(HostEvent::Relayed(serialized)).is_err() {
            log::warn!("dispatcher queue closed; relayed message dropped");
        }
    }
}

/// Read-only values the page module needs, frozen onto `window` ahead of it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageRelayConfig {
    subscription_prefix: String,
    token_param: &'static str,
    message_kind: &'static str,
    unknown_sender: &'static str,
}

impl PageRelayConfig {
    pub(crate) fn new(subscription_prefix: String) -> Self {
        Self {
            subscription_prefix,
            token_param: TOKEN_QUERY_PARAM,
            message_kind: NEW_MESSAGE_KIND,
            unknown_sender: UNKNOWN_SENDER,
        }
    }

    pub(crate) fn to_script(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!(
            "Object.defineProperty(window, \"__CHAT_NOTIFIER_CONFIG__\", {{ value: Object.freeze({json}) }});"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_bridge_enqueues_relayed_payload() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let bridge = HostBridge::new(tx);
        bridge.send_new_message(r#"{"sender":"a","content":"b"}"#.to_string());

        match rx.try_recv() {
            Ok(HostEvent::Relayed(payload)) => {
                assert_eq!(payload, r#"{"sender":"a","content":"b"}"#)
            }
            other => panic!("unexpected queue state: {other:?}"),
        }
    }

    #[test]
    fn closed_queue_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        HostBridge::new(tx).send_new_message("{}".to_string());
    }

    #[test]
    fn page_config_carries_prefix_and_wire_names() {
        let script = PageRelayConfig::new("wss://woa.wps.cn/sub".to_string())
            .to_script()
            .unwrap();
        assert!(script.starts_with("Object.defineProperty(window, \"__CHAT_NOTIFIER_CONFIG__\""));
        assert!(script.contains(
            r#"{"subscriptionPrefix":"wss://woa.wps.cn/sub","tokenParam":"req_id","messageKind":"new_message","unknownSender":"unknown"}"#
        ));
    }

    #[test]
    fn page_module_invokes_only_send_new_message() {
        let invoked: Vec<&str> = PAGE_RELAY_SCRIPT
            .match_indices("internals.invoke(\"")
            .map(|(at, marker)| {
                let rest = &PAGE_RELAY_SCRIPT[at + marker.len()..];
                &rest[..rest.find('"').unwrap()]
            })
            .collect();
        assert_eq!(invoked, ["send_new_message"]);
    }

    #[test]
    fn page_module_guards_against_double_injection() {
        assert!(PAGE_RELAY_SCRIPT.contains("session.phase !== UNINJECTED"));
        assert!(PAGE_RELAY_SCRIPT.contains("__CHAT_NOTIFIER_CONFIG__"));
        assert!(!PAGE_RELAY_SCRIPT.contains("__TAURI__."));
    }
}
