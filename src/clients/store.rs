use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use crate::models::{chat::Conversation, queue::DispatchOutcome, user::User};

/// Seam to the persistent document store. Handlers only see this trait;
/// the Postgres client below is wired in at startup.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, Error>;

    async fn get_conversation(&self, conversation_id: &str)
    -> Result<Option<Conversation>, Error>;

    /// Atomically claims a queued notification for processing. Returns false
    /// when another invocation already claimed or processed it.
    async fn claim_queued_notification(&self, notification_id: &str) -> Result<bool, Error>;

    async fn mark_notification_processed(
        &self,
        notification_id: &str,
        outcome: &DispatchOutcome,
    ) -> Result<(), Error>;

    /// Deletes processed queue records older than the cutoff as one batch;
    /// returns how many went away.
    async fn delete_processed_notifications_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, Error>;

    async fn record_invalid_token(&self, token: &str) -> Result<(), Error>;

    /// Nulls out user tokens previously reported unregistered by the
    /// transport; returns how many user records were touched.
    async fn purge_invalid_tokens(&self) -> Result<u64, Error>;

    async fn update_order_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        payment_status: &str,
    ) -> Result<(), Error>;

    async fn health_check(&self) -> Result<(), Error>;
}

pub struct PgStore {
    client: Client,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        info!("Connecting to PostgreSQL database");

        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection terminated");
            }
        });

        info!("PostgreSQL connection established");

        Ok(Self { client })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, Error> {
        let row = self
            .client
            .query_opt("SELECT id, fcm_token FROM users WHERE id = $1", &[&user_id])
            .await
            .map_err(|e| anyhow!("User lookup failed: {}", e))?;

        Ok(row.map(|row| User {
            id: row.get(0),
            fcm_token: row.get(1),
        }))
    }

    async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, Error> {
        let row = self
            .client
            .query_opt(
                "SELECT id, user_id FROM support_conversations WHERE id = $1",
                &[&conversation_id],
            )
            .await
            .map_err(|e| anyhow!("Conversation lookup failed: {}", e))?;

        Ok(row.map(|row| Conversation {
            id: row.get(0),
            user_id: row.get(1),
        }))
    }

    async fn claim_queued_notification(&self, notification_id: &str) -> Result<bool, Error> {
        // Single-statement conditional update; the loser of a concurrent
        // race observes zero affected rows.
        let claimed = self
            .client
            .execute(
                "UPDATE notifications_queue SET claimed = TRUE \
                 WHERE id = $1 AND NOT claimed AND NOT processed",
                &[&notification_id],
            )
            .await
            .map_err(|e| anyhow!("Claim update failed: {}", e))?;

        Ok(claimed > 0)
    }

    async fn mark_notification_processed(
        &self,
        notification_id: &str,
        outcome: &DispatchOutcome,
    ) -> Result<(), Error> {
        let (response, error) = match outcome {
            DispatchOutcome::Delivered(receipt) => (Some(receipt.as_str()), None),
            DispatchOutcome::Failed(message) => (None, Some(message.as_str())),
        };

        self.client
            .execute(
                "UPDATE notifications_queue \
                 SET processed = TRUE, processed_at = $2, response = $3, error = $4 \
                 WHERE id = $1",
                &[&notification_id, &Utc::now(), &response, &error],
            )
            .await
            .map_err(|e| anyhow!("Failed to mark notification processed: {}", e))?;

        debug!(notification_id, "Queued notification marked processed");

        Ok(())
    }

    async fn delete_processed_notifications_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let deleted = self
            .client
            .execute(
                "DELETE FROM notifications_queue WHERE processed AND processed_at < $1",
                &[&cutoff],
            )
            .await
            .map_err(|e| anyhow!("Notification cleanup failed: {}", e))?;

        Ok(deleted)
    }

    async fn record_invalid_token(&self, token: &str) -> Result<(), Error> {
        self.client
            .execute(
                "INSERT INTO invalid_tokens (token) VALUES ($1) ON CONFLICT DO NOTHING",
                &[&token],
            )
            .await
            .map_err(|e| anyhow!("Failed to record invalid token: {}", e))?;

        Ok(())
    }

    async fn purge_invalid_tokens(&self) -> Result<u64, Error> {
        let cleared = self
            .client
            .execute(
                "UPDATE users SET fcm_token = NULL \
                 WHERE fcm_token IN (SELECT token FROM invalid_tokens)",
                &[],
            )
            .await
            .map_err(|e| anyhow!("Token purge failed: {}", e))?;

        self.client
            .execute("DELETE FROM invalid_tokens", &[])
            .await
            .map_err(|e| anyhow!("Failed to drain invalid token set: {}", e))?;

        Ok(cleared)
    }

    async fn update_order_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        payment_status: &str,
    ) -> Result<(), Error> {
        self.client
            .execute(
                "UPDATE orders SET payment_status = $2, payment_id = $3 WHERE id = $1",
                &[&order_id, &payment_status, &payment_id],
            )
            .await
            .map_err(|e| anyhow!("Order payment update failed: {}", e))?;

        debug!(order_id, payment_status, "Order payment status updated");

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| anyhow!("Database health check failed: {}", e))?;

        Ok(())
    }
}
