use std::collections::HashMap;

use anyhow::{Error, Result};
use tracing::info;

use crate::{
    catalog,
    clients::store::Store,
    dispatch::{Notification, PushTransport},
    handlers::{CLICK_ACTION, LAUNCHER_ICON, resolve_push_token, send_or_report},
    models::order::Order,
};

const ORDERS_CHANNEL_ID: &str = "delivery_orders_channel";
const ORDERS_COLOR: &str = "#FF0000";

/// Reacts to a write on an existing order. Only a `status` transition
/// produces a notification; edits to any other field terminate silently.
pub async fn handle_order_updated(
    store: &dyn Store,
    push: &dyn PushTransport,
    order_id: &str,
    before: &Order,
    after: &Order,
) -> Result<Option<String>, Error> {
    if before.status == after.status {
        info!(order_id, "Order status unchanged, no notification");
        return Ok(None);
    }

    info!(
        order_id,
        from = %before.status,
        to = %after.status,
        "Order status changed"
    );

    let Some(token) = resolve_push_token(store, &after.user_id).await? else {
        return Ok(None);
    };

    let content = catalog::order_status_content(&after.status, &after.business_name, order_id);

    let mut data = HashMap::new();
    data.insert("orderId".to_string(), order_id.to_string());
    data.insert("status".to_string(), after.status.clone());
    data.insert("type".to_string(), "order_update".to_string());
    data.insert("click_action".to_string(), CLICK_ACTION.to_string());

    let notification = Notification::new(content.title, content.body, ORDERS_CHANNEL_ID)
        .with_data(data)
        .with_color(ORDERS_COLOR)
        .with_icon(LAUNCHER_ICON)
        .with_badge(1);

    send_or_report(store, push, &token, notification).await
}

/// Reacts to a freshly created order. The content is fixed and `status` in
/// the data payload is always `pending`, whatever the stored order says.
pub async fn handle_order_created(
    store: &dyn Store,
    push: &dyn PushTransport,
    order_id: &str,
    order: &Order,
) -> Result<Option<String>, Error> {
    info!(order_id, "New order created");

    let Some(token) = resolve_push_token(store, &order.user_id).await? else {
        return Ok(None);
    };

    let content = catalog::order_created_content(&order.business_name);

    let mut data = HashMap::new();
    data.insert("orderId".to_string(), order_id.to_string());
    data.insert("status".to_string(), "pending".to_string());
    data.insert("type".to_string(), "order_created".to_string());

    let notification = Notification::new(content.title, content.body, ORDERS_CHANNEL_ID)
        .with_data(data)
        .with_color(ORDERS_COLOR);

    send_or_report(store, push, &token, notification).await
}
