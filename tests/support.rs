use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use delivery_events::{
    clients::{mercadopago::PaymentProvider, store::Store},
    config::Config,
    dispatch::PushTransport,
    error::PushError,
    models::{
        chat::Conversation,
        fcm::FcmMessage,
        payment::{NewPreference, Payment, Preference},
        queue::DispatchOutcome,
        user::User,
    },
};

pub fn test_config() -> Config {
    Config {
        rabbitmq_url: "amqp://localhost:5672".to_string(),
        event_queue_name: "store_events".to_string(),
        failed_queue_name: "store_events_failed".to_string(),
        prefetch_count: 10,
        database_url: "postgres://localhost/delivery".to_string(),
        fcm_project_id: "delivery-app-test".to_string(),
        mp_access_token: "TEST-access-token".to_string(),
        mp_webhook_secret: "test-webhook-secret".to_string(),
        mp_base_url: "https://api.mercadopago.com".to_string(),
        service_api_key: "test-api-key".to_string(),
        payment_success_url: "https://app.example.com/payment-success".to_string(),
        payment_failure_url: "https://app.example.com/payment-failure".to_string(),
        payment_pending_url: "https://app.example.com/payment-pending".to_string(),
        payment_notification_url: "https://api.example.com/webhooks/mercadopago".to_string(),
        payment_currency: "ARS".to_string(),
        processed_retention_days: 7,
        cleanup_interval_hours: 24,
        server_port: 8080,
    }
}

/// In-memory Store double recording every mutation.
#[derive(Default)]
pub struct MemoryStore {
    users: HashMap<String, User>,
    conversations: HashMap<String, Conversation>,
    pub claim_result: bool,
    pub purge_result: u64,
    pub delete_result: u64,
    pub claims: Mutex<Vec<String>>,
    pub processed: Mutex<Vec<(String, DispatchOutcome)>>,
    pub invalid_tokens: Mutex<Vec<String>>,
    pub delete_cutoffs: Mutex<Vec<DateTime<Utc>>>,
    pub payment_updates: Mutex<Vec<(String, String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            claim_result: true,
            ..Default::default()
        }
    }

    pub fn with_user(mut self, id: &str, fcm_token: Option<&str>) -> Self {
        self.users.insert(
            id.to_string(),
            User {
                id: id.to_string(),
                fcm_token: fcm_token.map(String::from),
            },
        );
        self
    }

    pub fn with_conversation(mut self, id: &str, user_id: &str) -> Self {
        self.conversations.insert(
            id.to_string(),
            Conversation {
                id: id.to_string(),
                user_id: user_id.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, Error> {
        Ok(self.users.get(user_id).cloned())
    }

    async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, Error> {
        Ok(self.conversations.get(conversation_id).cloned())
    }

    async fn claim_queued_notification(&self, notification_id: &str) -> Result<bool, Error> {
        self.claims.lock().unwrap().push(notification_id.to_string());
        Ok(self.claim_result)
    }

    async fn mark_notification_processed(
        &self,
        notification_id: &str,
        outcome: &DispatchOutcome,
    ) -> Result<(), Error> {
        self.processed
            .lock()
            .unwrap()
            .push((notification_id.to_string(), outcome.clone()));
        Ok(())
    }

    async fn delete_processed_notifications_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, Error> {
        self.delete_cutoffs.lock().unwrap().push(cutoff);
        Ok(self.delete_result)
    }

    async fn record_invalid_token(&self, token: &str) -> Result<(), Error> {
        self.invalid_tokens.lock().unwrap().push(token.to_string());
        Ok(())
    }

    async fn purge_invalid_tokens(&self) -> Result<u64, Error> {
        Ok(self.purge_result)
    }

    async fn update_order_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        payment_status: &str,
    ) -> Result<(), Error> {
        self.payment_updates.lock().unwrap().push((
            order_id.to_string(),
            payment_id.to_string(),
            payment_status.to_string(),
        ));
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}

pub enum SendMode {
    Succeed(String),
    Fail(String),
    Unregistered,
}

/// PushTransport double capturing every message it is handed.
pub struct MockTransport {
    mode: SendMode,
    sent: Mutex<Vec<FcmMessage>>,
}

impl MockTransport {
    pub fn succeeding(receipt: &str) -> Self {
        Self {
            mode: SendMode::Succeed(receipt.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            mode: SendMode::Fail(message.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn unregistered() -> Self {
        Self {
            mode: SendMode::Unregistered,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<FcmMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for MockTransport {
    async fn send(&self, message: FcmMessage) -> Result<String, PushError> {
        self.sent.lock().unwrap().push(message);

        match &self.mode {
            SendMode::Succeed(receipt) => Ok(receipt.clone()),
            SendMode::Fail(message) => Err(PushError::Rejected(message.clone())),
            SendMode::Unregistered => Err(PushError::Unregistered),
        }
    }
}

/// PaymentProvider double.
pub struct MockPaymentProvider {
    pub preference: Preference,
    pub payment: Option<Payment>,
    pub fail_create: bool,
    pub created: Mutex<Vec<NewPreference>>,
    pub payment_requests: Mutex<Vec<String>>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self {
            preference: Preference {
                id: "pref-1".to_string(),
                init_point: "https://mp.example.com/init/pref-1".to_string(),
            },
            payment: None,
            fail_create: false,
            created: Mutex::new(Vec::new()),
            payment_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_preference(&self, preference: NewPreference) -> Result<Preference, Error> {
        self.created.lock().unwrap().push(preference);

        if self.fail_create {
            return Err(anyhow!("provider rejected the preference"));
        }

        Ok(self.preference.clone())
    }

    async fn get_payment(&self, payment_id: &str) -> Result<Payment, Error> {
        self.payment_requests
            .lock()
            .unwrap()
            .push(payment_id.to_string());

        self.payment
            .clone()
            .ok_or_else(|| anyhow!("payment not found"))
    }
}
