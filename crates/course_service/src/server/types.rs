use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON error body returned by every endpoint.
///
/// Serializes as `{"error": "...", "context": "..."}`, with `context`
/// omitted when there is nothing to add.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, context): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            context,
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let err = ApiErrorType::from((StatusCode::NOT_FOUND, "Course not found", None));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "error": "Course not found" })
        );

        let err = ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to query courses",
            Some("disk I/O error".to_string()),
        ));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "error": "Failed to query courses",
                "context": "disk I/O error"
            })
        );
    }
}
