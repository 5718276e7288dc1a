use std::sync::Arc;

use anyhow::{Error, Result};
use tracing_subscriber::EnvFilter;

use delivery_events::{
    api::{self, AppState},
    clients::{
        fcm::FcmClient,
        mercadopago::{MercadoPagoClient, PaymentProvider},
        rbmq::RabbitMqClient,
        store::{PgStore, Store},
    },
    config::Config,
    handlers::cleanup,
    utils,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting delivery events service");

    let store: Arc<dyn Store> = Arc::new(PgStore::connect(&config.database_url).await?);
    let push = FcmClient::new(&config);
    let payments: Arc<dyn PaymentProvider> = Arc::new(MercadoPagoClient::new(&config)?);
    let rabbitmq = RabbitMqClient::connect(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), store.clone(), payments));
    tokio::spawn(async move {
        if let Err(e) = api::run_api_server(state).await {
            tracing::error!(error = %e, "API server terminated");
        }
    });

    tokio::spawn(cleanup::run_cleanup_scheduler(config, store.clone()));

    utils::run_worker(&rabbitmq, store.as_ref(), &push).await
}
