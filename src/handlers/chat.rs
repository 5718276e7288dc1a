use std::collections::HashMap;

use anyhow::{Error, Result};
use tracing::info;

use crate::{
    catalog,
    clients::store::Store,
    dispatch::{Notification, PushTransport},
    handlers::{CLICK_ACTION, LAUNCHER_ICON, resolve_push_token, send_or_report},
    models::chat::{ChatMessage, SenderType},
};

const CHAT_CHANNEL_ID: &str = "chat_channel";
const CHAT_COLOR: &str = "#4CAF50";

/// Reacts to a message created under a support conversation. Only
/// support-authored messages notify the customer.
pub async fn handle_chat_message(
    store: &dyn Store,
    push: &dyn PushTransport,
    conversation_id: &str,
    message_id: &str,
    message: &ChatMessage,
) -> Result<Option<String>, Error> {
    info!(conversation_id, message_id, "New chat message");

    if message.sender_type != SenderType::Support {
        info!(conversation_id, "Message not authored by support, no notification");
        return Ok(None);
    }

    let Some(conversation) = store.get_conversation(conversation_id).await? else {
        info!(conversation_id, "Conversation not found, skipping notification");
        return Ok(None);
    };

    let Some(token) = resolve_push_token(store, &conversation.user_id).await? else {
        return Ok(None);
    };

    let body = message
        .message
        .clone()
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| catalog::CHAT_FALLBACK_BODY.to_string());

    let mut data = HashMap::new();
    data.insert("type".to_string(), "chat_message".to_string());
    data.insert("conversationId".to_string(), conversation_id.to_string());
    data.insert("messageId".to_string(), message_id.to_string());
    data.insert("click_action".to_string(), CLICK_ACTION.to_string());

    let notification = Notification::new(catalog::CHAT_TITLE, body, CHAT_CHANNEL_ID)
        .with_data(data)
        .with_color(CHAT_COLOR)
        .with_icon(LAUNCHER_ICON)
        .with_badge(1);

    send_or_report(store, push, &token, notification).await
}
