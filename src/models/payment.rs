use serde::{Deserialize, Serialize};

/// Caller request for a checkout preference. Fields are optional so
/// validation can name exactly what is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceRequest {
    #[serde(default)]
    pub order_id: Option<String>,

    #[serde(default)]
    pub amount: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Body sent to the provider when minting a checkout preference.
/// `external_reference` is the correlation key the webhook maps back to the
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPreference {
    pub items: Vec<PreferenceItem>,
    pub back_urls: BackUrls,
    pub auto_return: String,
    pub external_reference: String,
    pub notification_url: String,
}

/// Provider-created preference: the id plus the redirectable checkout link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub id: String,
    pub init_point: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceResponse {
    pub success: bool,
    pub preference_id: String,
    pub init_point: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub data: Option<WebhookEventData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub status: String,

    #[serde(default)]
    pub external_reference: Option<String>,
}
