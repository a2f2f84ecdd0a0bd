//! Request DTOs for the API.

use leadbot_models::NewLead;
use serde::Deserialize;

/// Booking form submission from the landing page.
///
/// Missing fields read as empty strings; only `phone` is required to be
/// non-blank, which the handler checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmitLeadRequest {
    pub car: String,
    pub name: String,
    pub phone: String,
}

impl From<SubmitLeadRequest> for NewLead {
    fn from(req: SubmitLeadRequest) -> Self {
        NewLead::new(req.name, req.phone, req.car)
    }
}
