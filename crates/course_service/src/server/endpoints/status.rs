use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// GET /health
///
/// Reports whether the service can reach its database.
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    match s.courses.ping() {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            ApiErrorType::from((
                StatusCode::SERVICE_UNAVAILABLE,
                "Database unavailable",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
