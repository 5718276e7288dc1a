use serde::{Deserialize, Serialize};

/// Order snapshot as the document store hands it over. `status` stays a raw
/// string: transitions are validated upstream and unknown values must still
/// flow through to the generic notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub user_id: String,
    pub business_name: String,
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}
