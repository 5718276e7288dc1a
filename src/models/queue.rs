use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted notification produced outside the trigger-driven flows.
/// Observed once on creation, then mutated in place with the attempt outcome
/// and eventually deleted by the cleanup job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedNotification {
    #[serde(default)]
    pub fcm_token: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub data: HashMap<String, String>,

    #[serde(default)]
    pub channel_id: Option<String>,

    #[serde(default)]
    pub processed: bool,

    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub response: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome of a queued notification's single dispatch attempt, persisted
/// onto the record as either `response` or `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered(String),
    Failed(String),
}
