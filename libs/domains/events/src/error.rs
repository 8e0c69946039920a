//! Event domain error types

use axum_helpers::AppError;
use thiserror::Error;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Event domain errors
#[derive(Debug, Error)]
pub enum EventError {
    /// No event with this id
    #[error("Event not found: {id}")]
    NotFound { id: String },

    /// Id is not a 24-character hex ObjectId
    #[error("Invalid event ID: {id}")]
    InvalidId { id: String },

    /// Query matched neither `id` nor `type=latest`
    #[error("Invalid query parameters")]
    InvalidQuery,

    /// Submitted field or query parameter failed to parse
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// MongoDB error
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<mongodb::error::Error>,
    },

    /// Blob store failed to persist an upload
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EventError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }
}

impl From<mongodb::error::Error> for EventError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<std::io::Error> for EventError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// Convert to axum_helpers::AppError for HTTP responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound { .. } => AppError::NotFound("Event not found".to_string()),
            EventError::InvalidId { .. } => AppError::InvalidId("Invalid event ID".to_string()),
            EventError::InvalidQuery => {
                AppError::BadRequest("Invalid query parameters".to_string())
            }
            EventError::Validation { message } => AppError::Validation(message),
            EventError::Database { message, .. } => AppError::InternalServerError(message),
            EventError::Storage { message, .. } => {
                AppError::InternalServerError(format!("Attachment storage failed: {}", message))
            }
            EventError::Internal { message } => AppError::InternalServerError(message),
        }
    }
}

impl axum::response::IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_codes() {
        let cases = [
            (EventError::NotFound { id: "x".into() }, StatusCode::NOT_FOUND),
            (EventError::InvalidId { id: "x".into() }, StatusCode::BAD_REQUEST),
            (EventError::InvalidQuery, StatusCode::BAD_REQUEST),
            (EventError::validation("bad"), StatusCode::BAD_REQUEST),
            (EventError::database("down"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                EventError::from(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(err.into_response().status(), expected, "{label}");
        }
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            EventError::NotFound { id: "abc".into() }.to_string(),
            "Event not found: abc"
        );
        assert_eq!(EventError::InvalidQuery.to_string(), "Invalid query parameters");
        assert_eq!(
            EventError::validation("schedule is required").to_string(),
            "Validation error: schedule is required"
        );

        let err = EventError::database("down");
        assert_eq!(err.to_string(), "Database error: down");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_io_error_is_storage_with_source() {
        let err = EventError::from(std::io::Error::other("disk full"));
        assert!(matches!(err, EventError::Storage { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
