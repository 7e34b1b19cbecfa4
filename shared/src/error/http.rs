//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::BrandNotFound
            | Self::ImageNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::CategoryNameExists
            | Self::CategorySlugExists
            | Self::BrandNameExists
            | Self::ImageUrlExists => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            Self::BusinessRule | Self::ProductLastImage => StatusCode::UNPROCESSABLE_ENTITY,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors and invalid moves)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
