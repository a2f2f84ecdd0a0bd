//! Response DTOs for the API.

use serde::Serialize;

/// Liveness response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Outcome of a lead submission.
///
/// `id` is present whenever the lead was stored, even if the notification
/// failed afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitLeadResponse {
    pub ok: bool,
    pub id: i64,
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Webhook acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}
