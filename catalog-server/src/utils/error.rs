//! Repository errors at the API boundary
//!
//! Maps [`RepoError`] onto the unified [`AppError`] so handlers and the
//! catalog service can use `?` across the layer.

use crate::db::repository::RepoError;
use shared::error::{AppError, ErrorCode};

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { code, message }
            | RepoError::Duplicate { code, message }
            | RepoError::Validation { code, message }
            | RepoError::BusinessRule { code, message } => AppError::with_message(code, message),
            RepoError::InvalidMove {
                category_id,
                parent_id,
            } => AppError::with_message(
                ErrorCode::CategoryInvalidParent,
                format!("Category {parent_id} cannot become the parent of category {category_id}"),
            )
            .with_detail("category_id", category_id)
            .with_detail("parent_id", parent_id),
            RepoError::Database(message) => AppError::database(message),
        }
    }
}
