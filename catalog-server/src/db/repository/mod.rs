//! Repository Module
//!
//! Plain SQL access to the catalog tables. Every function takes a
//! `&mut SqliteConnection` so callers decide the transaction scope: pass a
//! pool connection for a single statement, or `&mut *tx` to group writes.

pub mod brand;
pub mod category;
pub mod inventory;
pub mod product;
pub mod product_image;

use shared::error::ErrorCode;
use sqlx::SqliteConnection;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("Duplicate: {message}")]
    Duplicate { code: ErrorCode, message: String },

    #[error("Validation error: {message}")]
    Validation { code: ErrorCode, message: String },

    /// Re-parenting would create a cycle or target a missing parent
    #[error("Invalid move: category {category_id} cannot be placed under {parent_id}")]
    InvalidMove { category_id: i64, parent_id: i64 },

    #[error("Business rule violated: {message}")]
    BusinessRule { code: ErrorCode, message: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl RepoError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn duplicate(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Duplicate {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
        }
    }

    pub fn validation_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn business_rule(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::BusinessRule {
            code,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::duplicate(ErrorCode::AlreadyExists, db_err.message().to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Whether `slug` is already used in `table`, optionally ignoring one row.
///
/// Inactive rows count: slugs stay reserved after a soft delete.
async fn slug_taken(
    conn: &mut SqliteConnection,
    table: &'static str,
    slug: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE slug = ? AND id IS NOT ?");
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

/// First free slug among `base`, `base-1`, `base-2`, ...
pub(crate) async fn unique_slug(
    conn: &mut SqliteConnection,
    table: &'static str,
    base: &str,
    exclude_id: Option<i64>,
) -> RepoResult<String> {
    if !slug_taken(conn, table, base, exclude_id).await? {
        return Ok(base.to_string());
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !slug_taken(conn, table, &candidate, exclude_id).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
