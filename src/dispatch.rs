use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    error::PushError,
    models::fcm::{
        AndroidConfig, AndroidNotification, Aps, ApnsConfig, ApnsPayload, FcmMessage,
        FcmNotification,
    },
};

/// Seam to the external push-delivery transport.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Delivers a single message and returns the transport's delivery
    /// receipt.
    async fn send(&self, message: FcmMessage) -> Result<String, PushError>;
}

/// A notification ready for dispatch: content, client routing data and
/// platform delivery hints.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    pub channel_id: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<u32>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, channel_id: &str) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
            channel_id: channel_id.to_string(),
            color: None,
            icon: None,
            badge: None,
        }
    }

    pub fn with_data(mut self, data: HashMap<String, String>) -> Self {
        self.data = data;
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn with_badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }
}

/// Tokens are credentials; only this much of one may ever reach a log line.
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(12).collect();
    format!("{}...", prefix)
}

pub fn build_message(token: &str, notification: &Notification) -> FcmMessage {
    FcmMessage {
        token: token.to_string(),
        notification: FcmNotification {
            title: notification.title.clone(),
            body: notification.body.clone(),
        },
        data: notification.data.clone(),
        android: Some(AndroidConfig {
            priority: "high".to_string(),
            notification: AndroidNotification {
                channel_id: notification.channel_id.clone(),
                sound: "default".to_string(),
                color: notification.color.clone(),
                icon: notification.icon.clone(),
            },
        }),
        apns: notification.badge.map(|badge| ApnsConfig {
            payload: ApnsPayload {
                aps: Aps {
                    sound: "default".to_string(),
                    badge,
                },
            },
        }),
    }
}

/// Builds the single-recipient message and forwards it to the transport.
/// Failures are logged here; the calling handler decides whether they are
/// swallowed or persisted.
pub async fn dispatch(
    transport: &dyn PushTransport,
    token: &str,
    notification: Notification,
) -> Result<String, PushError> {
    info!(
        token = %token_preview(token),
        title = %notification.title,
        "Dispatching push notification"
    );

    let message = build_message(token, &notification);

    match transport.send(message).await {
        Ok(receipt) => {
            info!(receipt = %receipt, "Push notification delivered");
            Ok(receipt)
        }
        Err(e) => {
            warn!(
                token = %token_preview(token),
                error = %e,
                "Push delivery failed"
            );
            Err(e)
        }
    }
}
