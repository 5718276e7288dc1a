use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,
    pub event_queue_name: String,
    pub failed_queue_name: String,
    pub prefetch_count: u16,

    pub database_url: String,

    pub fcm_project_id: String,

    pub mp_access_token: String,
    pub mp_webhook_secret: String,
    #[serde(default = "default_mp_base_url")]
    pub mp_base_url: String,

    pub service_api_key: String,

    pub payment_success_url: String,
    pub payment_failure_url: String,
    pub payment_pending_url: String,
    pub payment_notification_url: String,
    #[serde(default = "default_payment_currency")]
    pub payment_currency: String,

    #[serde(default = "default_processed_retention_days")]
    pub processed_retention_days: i64,
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u64,

    pub server_port: u16,
}

fn default_mp_base_url() -> String {
    "https://api.mercadopago.com".to_string()
}

fn default_payment_currency() -> String {
    "ARS".to_string()
}

fn default_processed_retention_days() -> i64 {
    7
}

fn default_cleanup_interval_hours() -> u64 {
    24
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }
}
