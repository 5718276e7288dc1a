use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::Config,
    models::payment::{NewPreference, Payment, Preference},
};

/// Seam to the external payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Mints a provider-hosted checkout preference and returns the
    /// redirectable payment link alongside its id.
    async fn create_preference(&self, preference: NewPreference) -> Result<Preference, Error>;

    /// Fetches a payment's final state, including the external reference
    /// correlating it back to an order.
    async fn get_payment(&self, payment_id: &str) -> Result<Payment, Error>;
}

pub struct MercadoPagoClient {
    http_client: Client,
    base_url: String,
    access_token: String,
}

impl MercadoPagoClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url = %config.mp_base_url, "Mercado Pago client initialized");

        Ok(Self {
            http_client,
            base_url: config.mp_base_url.trim_end_matches('/').to_string(),
            access_token: config.mp_access_token.clone(),
        })
    }
}

#[async_trait]
impl PaymentProvider for MercadoPagoClient {
    async fn create_preference(&self, preference: NewPreference) -> Result<Preference, Error> {
        let url = format!("{}/checkout/preferences", self.base_url);

        debug!(
            external_reference = %preference.external_reference,
            "Creating payment preference"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&preference)
            .send()
            .await
            .map_err(|e| anyhow!("Payment provider request failed: {}", e))?;

        let status = response.status();

        if status.is_success() {
            let created: Preference = response
                .json()
                .await
                .map_err(|e| anyhow!("Failed to parse preference response: {}", e))?;

            info!(preference_id = %created.id, "Payment preference created");
            Ok(created)
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(anyhow!("Payment provider returned {}: {}", status, error_text))
        }
    }

    async fn get_payment(&self, payment_id: &str) -> Result<Payment, Error> {
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);

        debug!(payment_id, "Fetching payment from provider");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| anyhow!("Payment provider request failed: {}", e))?;

        let status = response.status();

        if status.is_success() {
            let payment: Payment = response
                .json()
                .await
                .map_err(|e| anyhow!("Failed to parse payment response: {}", e))?;

            Ok(payment)
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(anyhow!("Payment provider returned {}: {}", status, error_text))
        }
    }
}
