use anyhow::{Error, Result};
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use tracing::{error, info, warn};

use crate::{
    clients::{rbmq::RabbitMqClient, store::Store},
    dispatch::PushTransport,
    handlers,
    models::event::{ChangeEvent, DlqMessage, Envelope},
};

/// Decodes one change event and routes it to its handler. Returns the
/// delivery receipt when a notification went out, None on any guard path.
pub async fn process_event(
    payload: &str,
    store: &dyn Store,
    push: &dyn PushTransport,
) -> Result<Option<String>, Error> {
    let enveloped = serde_json::from_str::<Envelope>(payload)?;

    match enveloped.data {
        ChangeEvent::OrderCreated { order_id, order } => {
            handlers::orders::handle_order_created(store, push, &order_id, &order).await
        }
        ChangeEvent::OrderUpdated {
            order_id,
            before,
            after,
        } => {
            handlers::orders::handle_order_updated(store, push, &order_id, &before, &after).await
        }
        ChangeEvent::ChatMessageCreated {
            conversation_id,
            message_id,
            message,
        } => {
            handlers::chat::handle_chat_message(store, push, &conversation_id, &message_id, &message)
                .await
        }
        ChangeEvent::NotificationQueued {
            notification_id,
            notification,
        } => {
            handlers::queue::handle_queued_notification(store, push, &notification_id, &notification)
                .await
        }
    }
}

/// Consumes change events until the stream closes. Every event gets at most
/// one handling attempt: failures are published to the failed-events queue
/// and the original delivery is rejected without requeue.
pub async fn run_worker(
    rabbitmq: &RabbitMqClient,
    store: &dyn Store,
    push: &dyn PushTransport,
) -> Result<(), Error> {
    let mut consumer = rabbitmq.create_consumer().await?;

    info!("Event worker started");

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(error = %e, "Failed to receive delivery");
                continue;
            }
        };

        let payload = String::from_utf8_lossy(&delivery.data).to_string();

        match process_event(&payload, store, push).await {
            Ok(Some(receipt)) => {
                info!(receipt = %receipt, "Event handled, notification dispatched");
                rabbitmq.acknowledge(delivery.delivery_tag).await?;
            }
            Ok(None) => {
                rabbitmq.acknowledge(delivery.delivery_tag).await?;
            }
            Err(e) => {
                warn!(error = %e, "Event handling failed, routing to failed queue");

                let dlq_message = DlqMessage {
                    payload,
                    failure_reason: e.to_string(),
                    failed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                };

                if let Err(publish_err) = rabbitmq.publish_to_dlq(&dlq_message).await {
                    error!(error = %publish_err, "Failed to publish to failed queue");
                }

                rabbitmq.reject(delivery.delivery_tag, false).await?;
            }
        }
    }

    Ok(())
}
