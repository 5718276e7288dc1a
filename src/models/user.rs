use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Opaque push-delivery address. Absence is a valid terminal state for
    /// every handler that needs it.
    #[serde(default)]
    pub fcm_token: Option<String>,
}
