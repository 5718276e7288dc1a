pub mod chat;
pub mod cleanup;
pub mod orders;
pub mod queue;

use anyhow::{Error, Result};
use tracing::{info, warn};

use crate::{
    clients::store::Store,
    dispatch::{self, Notification, PushTransport, token_preview},
    error::PushError,
};

pub(crate) const LAUNCHER_ICON: &str = "@mipmap/ic_launcher";
pub(crate) const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Resolves a user's current push-delivery address. A missing user or a
/// missing token is a normal terminal state, not an error; callers must stop
/// handling the event without side effects.
pub async fn resolve_push_token(
    store: &dyn Store,
    user_id: &str,
) -> Result<Option<String>, Error> {
    let Some(user) = store.get_user(user_id).await? else {
        info!(user_id, "User not found, skipping notification");
        return Ok(None);
    };

    match user.fcm_token {
        Some(token) if !token.is_empty() => {
            info!(user_id, token = %token_preview(&token), "Resolved push token");
            Ok(Some(token))
        }
        _ => {
            info!(user_id, "User has no push token, skipping notification");
            Ok(None)
        }
    }
}

/// Dispatches and swallows transport failures so the triggering event is
/// never redelivered. Unregistered tokens are recorded for the cleanup job.
pub(crate) async fn send_or_report(
    store: &dyn Store,
    push: &dyn PushTransport,
    token: &str,
    notification: Notification,
) -> Result<Option<String>, Error> {
    match dispatch::dispatch(push, token, notification).await {
        Ok(receipt) => Ok(Some(receipt)),
        Err(PushError::Unregistered) => {
            note_unregistered_token(store, token).await;
            Ok(None)
        }
        Err(_) => Ok(None),
    }
}

pub(crate) async fn note_unregistered_token(store: &dyn Store, token: &str) {
    if let Err(e) = store.record_invalid_token(token).await {
        warn!(
            token = %token_preview(token),
            error = %e,
            "Failed to record invalid token"
        );
    }
}
