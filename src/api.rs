use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    clients::{health::HealthChecker, mercadopago::PaymentProvider, store::Store},
    config::Config,
    error::AppError,
    models::{
        health::HealthStatus,
        payment::{
            BackUrls, CreatePreferenceRequest, CreatePreferenceResponse, NewPreference,
            PreferenceItem, WebhookEvent,
        },
    },
};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-signature";
const REQUEST_ID_HEADER: &str = "x-request-id";

const EVENT_TYPE_PAYMENT: &str = "payment";

pub struct AppState {
    config: Config,
    health_checker: HealthChecker,
    store: Arc<dyn Store>,
    payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, payments: Arc<dyn PaymentProvider>) -> Self {
        Self {
            health_checker: HealthChecker::new(config.clone()),
            config,
            store,
            payments,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/payments/preferences", post(create_payment_preference))
        .route("/webhooks/mercadopago", post(mercado_pago_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(state: Arc<AppState>) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let app = router(state);

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "API server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Mints a provider-hosted checkout preference for an order. Callers carry
/// the credential the host platform hands authenticated clients.
async fn create_payment_preference(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreatePreferenceRequest>,
) -> Result<Json<CreatePreferenceResponse>, AppError> {
    authorize_caller(&state.config, &headers)?;

    let order_id = request
        .order_id
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::InvalidArgument("Missing required field: orderId".to_string()))?;

    let description = request
        .description
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::InvalidArgument("Missing required field: description".to_string())
        })?;

    let amount = request
        .amount
        .ok_or_else(|| AppError::InvalidArgument("Missing required field: amount".to_string()))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::InvalidArgument(
            "amount must be a positive number".to_string(),
        ));
    }

    info!(order_id, "Creating payment preference");

    let preference = NewPreference {
        items: vec![PreferenceItem {
            title: description.to_string(),
            quantity: 1,
            unit_price: amount,
            currency_id: state.config.payment_currency.clone(),
        }],
        back_urls: BackUrls {
            success: state.config.payment_success_url.clone(),
            failure: state.config.payment_failure_url.clone(),
            pending: state.config.payment_pending_url.clone(),
        },
        auto_return: "approved".to_string(),
        external_reference: order_id.to_string(),
        notification_url: state.config.payment_notification_url.clone(),
    };

    let created = state
        .payments
        .create_preference(preference)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(CreatePreferenceResponse {
        success: true,
        preference_id: created.id,
        init_point: created.init_point,
    }))
}

/// Inbound provider callback. Only `payment` events carry work: the payment
/// is fetched from the provider and its external reference maps the result
/// back onto the order.
async fn mercado_pago_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidArgument(format!("Invalid webhook payload: {}", e)))?;

    info!(event_type = %event.event_type, "Webhook received from payment provider");

    if event.event_type != EVENT_TYPE_PAYMENT {
        return Ok(StatusCode::OK);
    }

    let Some(data) = event.data else {
        warn!("Payment event without payload data");
        return Ok(StatusCode::OK);
    };

    verify_webhook_signature(&state.config, &headers, &data.id)?;

    let payment = state
        .payments
        .get_payment(&data.id)
        .await
        .map_err(AppError::Internal)?;

    info!(
        payment_id = payment.id,
        status = %payment.status,
        "Payment event received"
    );

    let Some(order_id) = payment
        .external_reference
        .filter(|reference| !reference.is_empty())
    else {
        warn!(
            payment_id = payment.id,
            "Payment carries no external reference, nothing to update"
        );
        return Ok(StatusCode::OK);
    };

    state
        .store
        .update_order_payment(&order_id, &payment.id.to_string(), &payment.status)
        .await
        .map_err(AppError::Internal)?;

    info!(order_id = %order_id, status = %payment.status, "Order payment status updated");

    Ok(StatusCode::OK)
}

fn authorize_caller(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let token = authorization
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthenticated)?;

    if token != config.service_api_key {
        return Err(AppError::Unauthenticated);
    }

    Ok(())
}

/// Checks the provider's `x-signature` header: an HMAC-SHA256 over the
/// documented `id:...;request-id:...;ts:...;` manifest.
fn verify_webhook_signature(
    config: &Config,
    headers: &HeaderMap,
    data_id: &str,
) -> Result<(), AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let mut ts = None;
    let mut v1 = None;

    for part in signature.split(',') {
        match part.trim().split_once('=') {
            Some(("ts", value)) => ts = Some(value.trim()),
            Some(("v1", value)) => v1 = Some(value.trim()),
            _ => {}
        }
    }

    let (Some(ts), Some(v1)) = (ts, v1) else {
        return Err(AppError::InvalidSignature);
    };

    let manifest = format!(
        "id:{};request-id:{};ts:{};",
        data_id.to_lowercase(),
        request_id,
        ts
    );

    let mut mac = HmacSha256::new_from_slice(config.mp_webhook_secret.as_bytes())
        .map_err(|_| AppError::InvalidSignature)?;
    mac.update(manifest.as_bytes());

    let expected = hex::decode(v1).map_err(|_| AppError::InvalidSignature)?;
    mac.verify_slice(&expected)
        .map_err(|_| AppError::InvalidSignature)?;

    Ok(())
}
