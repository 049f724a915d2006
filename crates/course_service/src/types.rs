use crate::db::CourseRepository;

/// State shared by every request handler.
pub struct AppState {
    /// Access to the `courses` table
    pub courses: CourseRepository,
}

impl AppState {
    pub fn new(courses: CourseRepository) -> Self {
        Self { courses }
    }
}
