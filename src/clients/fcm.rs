use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::Config,
    dispatch::PushTransport,
    error::PushError,
    models::fcm::{FcmMessage, FcmRequest, FcmSendResponse},
};

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

pub struct FcmClient {
    http_client: Client,
    fcm_project_id: String,
}

impl FcmClient {
    pub fn new(config: &Config) -> Self {
        info!(project_id = %config.fcm_project_id, "FCM client initialized");

        Self {
            http_client: Client::new(),
            fcm_project_id: config.fcm_project_id.clone(),
        }
    }
}

#[async_trait]
impl PushTransport for FcmClient {
    async fn send(&self, message: FcmMessage) -> Result<String, PushError> {
        debug!(project_id = %self.fcm_project_id, "Sending FCM push notification");

        let provider = gcp_auth::provider()
            .await
            .map_err(|e| PushError::Other(anyhow!("FCM auth provider failed: {}", e)))?;

        let token = provider
            .token(&[FCM_SCOPE])
            .await
            .map_err(|e| PushError::Other(anyhow!("FCM auth token failed: {}", e)))?;

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.fcm_project_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&FcmRequest { message })
            .send()
            .await
            .map_err(|e| PushError::Other(anyhow!("FCM request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let parsed: FcmSendResponse = response
                .json()
                .await
                .map_err(|e| PushError::Other(anyhow!("Failed to parse FCM response: {}", e)))?;

            info!(receipt = %parsed.name, "FCM push notification sent successfully");
            Ok(parsed.name)
        } else {
            let error_text = response
                .text()
                .await
                .map_err(|e| PushError::Other(anyhow!("Failed to read FCM error: {}", e)))?;

            if error_text.contains("UNREGISTERED") {
                Err(PushError::Unregistered)
            } else {
                Err(PushError::Rejected(format!(
                    "FCM returned {}: {}",
                    status, error_text
                )))
            }
        }
    }
}
