//! Error types for the course repository.

use thiserror::Error;

/// Errors that can occur during course repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CourseError {
    /// Client input was incomplete or held an invalid value
    #[error("Invalid value for `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    /// No row matched the requested course ID
    #[error("Course not found")]
    NotFound,

    /// A course with this ID already exists
    #[error("Course {course_id} already exists")]
    Conflict { course_id: i64 },

    /// The database, the pool or a stored value failed
    #[error("Store error: {message}")]
    Store { message: String },
}

impl CourseError {
    /// Shorthand for a required field that was not supplied.
    pub fn missing(field: &'static str) -> Self {
        CourseError::Validation {
            field,
            message: "field is required".to_string(),
        }
    }

    /// Returns true if the error was caused by the client's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CourseError::Validation { .. } | CourseError::NotFound
        )
    }
}

impl From<rusqlite::Error> for CourseError {
    fn from(err: rusqlite::Error) -> Self {
        CourseError::Store {
            message: err.to_string(),
        }
    }
}

impl From<r2d2::Error> for CourseError {
    fn from(err: r2d2::Error) -> Self {
        CourseError::Store {
            message: format!("Failed to acquire a database connection: {}", err),
        }
    }
}

impl From<serde_json::Error> for CourseError {
    fn from(err: serde_json::Error) -> Self {
        CourseError::Store {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = CourseError::missing("subject");
        assert_eq!(
            err.to_string(),
            "Invalid value for `subject`: field is required"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_store_errors_are_not_client_errors() {
        let err = CourseError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, CourseError::Store { .. }));
        assert!(!err.is_client_error());
        assert!(!CourseError::Conflict { course_id: 1 }.is_client_error());
    }
}
