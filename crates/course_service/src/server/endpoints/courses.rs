//! CRUD endpoints for course offerings.
//!
//! Handlers only translate between HTTP and `CourseRepository`; all
//! validation and partial-update resolution happens in the repository.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::{CourseDraft, CourseError, CoursePatch};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

const INVALID_BODY: &str = "Invalid JSON body";

/// Converts CourseError to API response.
///
/// `failure` is the message used for store failures. Duplicate IDs are
/// reported the same way as any other store failure.
fn course_error_to_response(error: CourseError, failure: &str) -> Response {
    if error.is_client_error() {
        warn!("Rejected course request: {}", error);
    } else {
        error!("{}: {}", failure, error);
    }

    let (status, message, context) = match &error {
        CourseError::NotFound => (StatusCode::NOT_FOUND, "Course not found", None),
        CourseError::Validation { .. } => {
            (StatusCode::BAD_REQUEST, INVALID_BODY, Some(error.to_string()))
        }
        CourseError::Conflict { .. } | CourseError::Store { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            failure,
            Some(error.to_string()),
        ),
    };

    ApiErrorType::from((status, message, context)).into_response()
}

fn rejection_to_response(rejection: JsonRejection) -> Response {
    warn!("Rejected malformed course body: {}", rejection.body_text());
    ApiErrorType::from((
        StatusCode::BAD_REQUEST,
        INVALID_BODY,
        Some(rejection.body_text()),
    ))
    .into_response()
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

/// GET /courses
///
/// Returns every course as a JSON array.
pub async fn get_courses(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /courses");

    match s.courses.list_all() {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => course_error_to_response(e, "Failed to query courses"),
    }
}

/// GET /courses/:id
pub async fn get_course(
    Path(course_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /courses/{}", course_id);

    match s.courses.get_by_id(&course_id) {
        Ok(course) => (StatusCode::OK, Json(course)).into_response(),
        Err(e) => course_error_to_response(e, "Failed to fetch course"),
    }
}

/// POST /courses
///
/// Creates a course. Every field except `current_student` and
/// `prerequisite` is required.
pub async fn post_course(
    State(s): State<Arc<AppState>>,
    body: Result<Json<CourseDraft>, JsonRejection>,
) -> Response {
    info!("POST /courses");

    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_to_response(rejection),
    };

    match s.courses.create(draft) {
        Ok(course) => {
            info!("Created course {} ({})", course.course_id, course.subject);
            message(StatusCode::CREATED, "Course created successfully")
        }
        Err(e) => course_error_to_response(e, "Failed to create course"),
    }
}

/// PUT /courses/:id
///
/// Partially updates a course. Fields missing from the body keep their
/// stored values.
pub async fn put_course(
    Path(course_id): Path<String>,
    State(s): State<Arc<AppState>>,
    body: Result<Json<CoursePatch>, JsonRejection>,
) -> Response {
    info!("PUT /courses/{}", course_id);

    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_to_response(rejection),
    };

    match s.courses.update(&course_id, patch) {
        Ok(()) => message(StatusCode::OK, "Course updated successfully"),
        Err(e) => course_error_to_response(e, "Failed to update course"),
    }
}

/// DELETE /courses/:id
pub async fn delete_course(
    Path(course_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /courses/{}", course_id);

    match s.courses.delete(&course_id) {
        Ok(()) => message(StatusCode::OK, "Course deleted successfully"),
        Err(e) => course_error_to_response(e, "Failed to delete course"),
    }
}
