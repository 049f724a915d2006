use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::server::endpoints::{courses, status};
use crate::types::AppState;

mod endpoints;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(status::get_health))
        .route(
            "/courses",
            get(courses::get_courses).post(courses::post_course),
        )
        .route(
            "/courses/:id",
            get(courses::get_course)
                .put(courses::put_course)
                .delete(courses::delete_course),
        )
        .with_state(app_state)
}
