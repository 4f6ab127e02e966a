use serde::{Deserialize, Serialize};

use crate::models::{Contact, DashboardStats, Message, MessageStatus, Setting};

/// Change notifications pushed to store subscribers and WebSocket clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEvent {
    Snapshot(StoreSnapshot),
    Ready,
    ContactAdded(Contact),
    ContactUpdated(Contact),
    ContactDeleted { id: i32 },
    MessageQueued(Message),
    MessageStatusChanged { id: i32, status: MessageStatus },
    StatsUpdated(DashboardStats),
    SettingUpdated(Setting),
}

impl GatewayEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayEvent::Snapshot(_) => "SNAPSHOT",
            GatewayEvent::Ready => "READY",
            GatewayEvent::ContactAdded(_) => "CONTACT_ADDED",
            GatewayEvent::ContactUpdated(_) => "CONTACT_UPDATED",
            GatewayEvent::ContactDeleted { .. } => "CONTACT_DELETED",
            GatewayEvent::MessageQueued(_) => "MESSAGE_QUEUED",
            GatewayEvent::MessageStatusChanged { .. } => "MESSAGE_STATUS_CHANGED",
            GatewayEvent::StatsUpdated(_) => "STATS_UPDATED",
            GatewayEvent::SettingUpdated(_) => "SETTING_UPDATED",
        }
    }
}

/// Full read model, sent to WebSocket clients on connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub contacts: Vec<Contact>,
    pub messages: Vec<Message>,
    pub stats: DashboardStats,
    pub settings: Vec<Setting>,
    pub loading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_is_tagged() {
        let event = GatewayEvent::MessageStatusChanged {
            id: 16,
            status: MessageStatus::Sent,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["payload"]["id"], 16);
        assert_eq!(json["payload"]["status"], "sent");
    }

    #[test]
    fn ready_has_no_payload() {
        let json = serde_json::to_string(&GatewayEvent::Ready).unwrap();
        assert_eq!(json, r#"{"type":"READY"}"#);
    }
}
