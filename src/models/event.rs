use serde::{Deserialize, Serialize};

use crate::models::{chat::ChatMessage, order::Order, queue::QueuedNotification};

/// Envelope the document store's change feed wraps around every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub data: ChangeEvent,
}

/// One document-store write, delivered with the snapshots the handlers need.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ChangeEvent {
    OrderCreated {
        order_id: String,
        order: Order,
    },
    OrderUpdated {
        order_id: String,
        before: Order,
        after: Order,
    },
    ChatMessageCreated {
        conversation_id: String,
        message_id: String,
        message: ChatMessage,
    },
    NotificationQueued {
        notification_id: String,
        notification: QueuedNotification,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqMessage {
    pub payload: String,
    pub failure_reason: String,
    pub failed_at: String,
}
