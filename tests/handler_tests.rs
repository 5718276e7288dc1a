use delivery_events::{
    handlers::{
        chat::handle_chat_message,
        orders::{handle_order_created, handle_order_updated},
    },
    models::{
        chat::{ChatMessage, SenderType},
        order::Order,
    },
};

use crate::support::{MemoryStore, MockTransport};

const ORDER_ID: &str = "abcdef1234567890";

fn order(user_id: &str, business_name: &str, status: &str) -> Order {
    Order {
        user_id: user_id.to_string(),
        business_name: business_name.to_string(),
        status: status.to_string(),
        payment_status: None,
        payment_id: None,
    }
}

fn chat_message(sender_type: SenderType, message: Option<&str>) -> ChatMessage {
    ChatMessage {
        sender_type,
        message: message.map(String::from),
    }
}

#[tokio::test]
async fn unchanged_status_never_dispatches() {
    let store = MemoryStore::new().with_user("user-1", Some("T"));
    let transport = MockTransport::succeeding("projects/demo/messages/1");

    let result = handle_order_updated(
        &store,
        &transport,
        ORDER_ID,
        &order("user-1", "Acme", "confirmed"),
        &order("user-1", "Acme", "confirmed"),
    )
    .await
    .unwrap();

    assert_eq!(result, None);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn status_change_dispatches_catalog_content_to_user_token() {
    let store = MemoryStore::new().with_user("user-1", Some("T"));
    let transport = MockTransport::succeeding("projects/demo/messages/1");

    let result = handle_order_updated(
        &store,
        &transport,
        ORDER_ID,
        &order("user-1", "Acme", "confirmed"),
        &order("user-1", "Acme", "preparing"),
    )
    .await
    .unwrap();

    assert_eq!(result.as_deref(), Some("projects/demo/messages/1"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);

    let message = &sent[0];
    assert_eq!(message.token, "T");
    assert_eq!(message.notification.title, "👨‍🍳 Preparando tu pedido");
    assert_eq!(
        message.notification.body,
        "Acme está preparando tu pedido #abcdef12"
    );
    assert_eq!(
        message.data.get("type").map(String::as_str),
        Some("order_update")
    );
    assert_eq!(
        message.data.get("status").map(String::as_str),
        Some("preparing")
    );
    assert_eq!(
        message.data.get("orderId").map(String::as_str),
        Some(ORDER_ID)
    );
    assert_eq!(
        message.data.get("click_action").map(String::as_str),
        Some("FLUTTER_NOTIFICATION_CLICK")
    );

    let android = message.android.as_ref().unwrap();
    assert_eq!(android.priority, "high");
    assert_eq!(android.notification.channel_id, "delivery_orders_channel");
    assert_eq!(android.notification.sound, "default");
    assert_eq!(android.notification.color.as_deref(), Some("#FF0000"));
    assert_eq!(
        android.notification.icon.as_deref(),
        Some("@mipmap/ic_launcher")
    );

    assert_eq!(message.apns.as_ref().unwrap().payload.aps.badge, 1);
}

#[tokio::test]
async fn status_change_without_token_is_a_noop() {
    let store = MemoryStore::new().with_user("user-1", None);
    let transport = MockTransport::succeeding("projects/demo/messages/1");

    let result = handle_order_updated(
        &store,
        &transport,
        ORDER_ID,
        &order("user-1", "Acme", "confirmed"),
        &order("user-1", "Acme", "on_way"),
    )
    .await
    .unwrap();

    assert_eq!(result, None);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn status_change_for_unknown_user_is_a_noop() {
    let store = MemoryStore::new();
    let transport = MockTransport::succeeding("projects/demo/messages/1");

    let result = handle_order_updated(
        &store,
        &transport,
        ORDER_ID,
        &order("ghost", "Acme", "confirmed"),
        &order("ghost", "Acme", "on_way"),
    )
    .await
    .unwrap();

    assert_eq!(result, None);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn transport_failure_is_swallowed() {
    let store = MemoryStore::new().with_user("user-1", Some("T"));
    let transport = MockTransport::failing("quota exceeded");

    let result = handle_order_updated(
        &store,
        &transport,
        ORDER_ID,
        &order("user-1", "Acme", "confirmed"),
        &order("user-1", "Acme", "delivered"),
    )
    .await
    .unwrap();

    assert_eq!(result, None);
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn unregistered_token_is_recorded_for_cleanup() {
    let store = MemoryStore::new().with_user("user-1", Some("stale-token"));
    let transport = MockTransport::unregistered();

    let result = handle_order_updated(
        &store,
        &transport,
        ORDER_ID,
        &order("user-1", "Acme", "confirmed"),
        &order("user-1", "Acme", "delivered"),
    )
    .await
    .unwrap();

    assert_eq!(result, None);
    assert_eq!(
        store.invalid_tokens.lock().unwrap().as_slice(),
        ["stale-token"]
    );
}

#[tokio::test]
async fn new_order_notifies_with_pending_status_regardless_of_snapshot() {
    let store = MemoryStore::new().with_user("user-1", Some("T"));
    let transport = MockTransport::succeeding("projects/demo/messages/2");

    let result = handle_order_created(
        &store,
        &transport,
        ORDER_ID,
        &order("user-1", "La Esquina", "confirmed"),
    )
    .await
    .unwrap();

    assert_eq!(result.as_deref(), Some("projects/demo/messages/2"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);

    let message = &sent[0];
    assert_eq!(message.notification.title, "🎉 ¡Pedido recibido!");
    assert_eq!(
        message.data.get("status").map(String::as_str),
        Some("pending")
    );
    assert_eq!(
        message.data.get("type").map(String::as_str),
        Some("order_created")
    );
    assert!(!message.data.contains_key("click_action"));
    assert!(message.apns.is_none());
}

#[tokio::test]
async fn customer_messages_never_notify() {
    let store = MemoryStore::new()
        .with_conversation("conv-1", "user-1")
        .with_user("user-1", Some("T"));
    let transport = MockTransport::succeeding("projects/demo/messages/3");

    let result = handle_chat_message(
        &store,
        &transport,
        "conv-1",
        "msg-1",
        &chat_message(SenderType::Customer, Some("Hola")),
    )
    .await
    .unwrap();

    assert_eq!(result, None);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn support_message_body_is_forwarded() {
    let store = MemoryStore::new()
        .with_conversation("conv-1", "user-1")
        .with_user("user-1", Some("T"));
    let transport = MockTransport::succeeding("projects/demo/messages/3");

    let result = handle_chat_message(
        &store,
        &transport,
        "conv-1",
        "msg-1",
        &chat_message(SenderType::Support, Some("Hola")),
    )
    .await
    .unwrap();

    assert_eq!(result.as_deref(), Some("projects/demo/messages/3"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);

    let message = &sent[0];
    assert_eq!(message.token, "T");
    assert_eq!(message.notification.title, "💬 Equipo de Soporte");
    assert_eq!(message.notification.body, "Hola");
    assert_eq!(
        message.data.get("type").map(String::as_str),
        Some("chat_message")
    );
    assert_eq!(
        message.data.get("conversationId").map(String::as_str),
        Some("conv-1")
    );
    assert_eq!(
        message.data.get("messageId").map(String::as_str),
        Some("msg-1")
    );

    let android = message.android.as_ref().unwrap();
    assert_eq!(android.notification.channel_id, "chat_channel");
    assert_eq!(android.notification.color.as_deref(), Some("#4CAF50"));
}

#[tokio::test]
async fn missing_or_empty_message_uses_fallback_body() {
    for message_text in [None, Some("")] {
        let store = MemoryStore::new()
            .with_conversation("conv-1", "user-1")
            .with_user("user-1", Some("T"));
        let transport = MockTransport::succeeding("projects/demo/messages/3");

        handle_chat_message(
            &store,
            &transport,
            "conv-1",
            "msg-1",
            &chat_message(SenderType::Support, message_text),
        )
        .await
        .unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].notification.body, "Te han enviado un mensaje");
    }
}

#[tokio::test]
async fn missing_conversation_is_a_noop() {
    let store = MemoryStore::new().with_user("user-1", Some("T"));
    let transport = MockTransport::succeeding("projects/demo/messages/3");

    let result = handle_chat_message(
        &store,
        &transport,
        "conv-missing",
        "msg-1",
        &chat_message(SenderType::Support, Some("Hola")),
    )
    .await
    .unwrap();

    assert_eq!(result, None);
    assert!(transport.sent().is_empty());
}
