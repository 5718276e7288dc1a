use anyhow::{Error, Result};
use tracing::info;

use crate::{
    catalog,
    clients::store::Store,
    dispatch::{self, Notification, PushTransport},
    error::PushError,
    handlers::note_unregistered_token,
    models::queue::{DispatchOutcome, QueuedNotification},
};

/// Processes a queued notification exactly once. Unlike the other handlers,
/// the dispatch outcome is persisted onto the originating record instead of
/// being silently discarded.
pub async fn handle_queued_notification(
    store: &dyn Store,
    push: &dyn PushTransport,
    notification_id: &str,
    record: &QueuedNotification,
) -> Result<Option<String>, Error> {
    info!(notification_id, "Processing queued notification");

    if record.processed {
        info!(notification_id, "Notification already processed, skipping");
        return Ok(None);
    }

    // A tokenless record is left unprocessed on purpose: it never claimed
    // the record, so a producer fix can re-trigger it later.
    let Some(token) = record.fcm_token.clone().filter(|token| !token.is_empty()) else {
        info!(notification_id, "Queued notification has no push token");
        return Ok(None);
    };

    if !store.claim_queued_notification(notification_id).await? {
        info!(notification_id, "Record claimed elsewhere, skipping");
        return Ok(None);
    }

    let title = record
        .title
        .clone()
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| catalog::QUEUE_DEFAULT_TITLE.to_string());
    let body = record.body.clone().unwrap_or_default();
    let channel_id = record
        .channel_id
        .clone()
        .filter(|channel| !channel.is_empty())
        .unwrap_or_else(|| catalog::QUEUE_DEFAULT_CHANNEL.to_string());

    let notification =
        Notification::new(title, body, &channel_id).with_data(record.data.clone());

    let outcome = match dispatch::dispatch(push, &token, notification).await {
        Ok(receipt) => DispatchOutcome::Delivered(receipt),
        Err(e) => {
            if matches!(e, PushError::Unregistered) {
                note_unregistered_token(store, &token).await;
            }
            DispatchOutcome::Failed(e.to_string())
        }
    };

    store
        .mark_notification_processed(notification_id, &outcome)
        .await?;

    match outcome {
        DispatchOutcome::Delivered(receipt) => Ok(Some(receipt)),
        DispatchOutcome::Failed(_) => Ok(None),
    }
}
