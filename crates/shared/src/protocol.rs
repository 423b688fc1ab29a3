use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Seconds a reveal token stays valid for a follow-up claim.
pub const REVEAL_TOKEN_TTL_SECONDS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealResponse {
    pub success: bool,
    pub prize: i64,
    pub reveal_token: String,
    pub expires_in: u64,
    pub message: String,
}

/// Claim submission. Fields are optional at the wire level so that a missing
/// field surfaces as a validation error rather than a deserialization
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kseb_consumer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kseb_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub success: bool,
    pub message: String,
    pub reference_id: String,
}

/// One entry in the analytics event log. Serializes in the shape the sink
/// contract expects: `{event: string, ...fields}` plus the capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub event: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub recorded_at: DateTime<Utc>,
}

impl AnalyticsRecord {
    pub fn new(event: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            event: event.into(),
            fields,
            recorded_at: Utc::now(),
        }
    }

    pub fn named(event: impl Into<String>) -> Self {
        Self::new(event, Map::new())
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}
