//! Liveness handler.

use axum::{extract::State, Json};

use crate::state::AppState;
use crate::types::HealthResponse;

/// GET /api/health and GET /api/bot
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.config.uptime_seconds(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::make_test_state;

    #[tokio::test]
    async fn test_health_handler() {
        let state = make_test_state("http://127.0.0.1:9/", Some(1));
        let response = health(State(state)).await;

        assert_eq!(response.status, "alive");
        assert!(!response.version.is_empty());
    }
}
