//! Lead submission handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use leadbot_models::NewLead;
use leadbot_persistence::LeadStore;
use leadbot_telegram::TransportError;
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{SubmitLeadRequest, SubmitLeadResponse};

/// POST /api/leads (also /api/sendOrder) - Store a lead and notify operators.
///
/// The lead is persisted before the notification is attempted and stays
/// persisted if the notification fails; the response then carries the id with
/// `notified: false`.
pub async fn submit_lead(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubmitLeadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitLeadResponse>)> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if req.phone.trim().is_empty() {
        return Err(ApiError::BadRequest("phone is required".to_string()));
    }

    let lead = state.store.create(NewLead::from(req)).await?;
    info!(lead_id = %lead.id, "Lead created");

    match state.notifier.notify(&lead).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(SubmitLeadResponse {
                ok: true,
                id: lead.id.get(),
                notified: true,
                error: None,
            }),
        )),
        Err(e) => {
            warn!(lead_id = %lead.id, error = %e, "Lead stored but notification failed");
            let status = if e.is_configuration() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::BAD_GATEWAY
            };
            let error = match e {
                TransportError::Rejected { body, .. } => body,
                other => other.to_string(),
            };
            Ok((
                status,
                Json(SubmitLeadResponse {
                    ok: false,
                    id: lead.id.get(),
                    notified: false,
                    error: Some(error),
                }),
            ))
        }
    }
}
