//! Utilities - error bridging, logging and input validation
//!
//! - [`AppError`] / [`ApiResponse`] come from `shared::error`
//! - `From<RepoError> for AppError` lives in [`error`]

pub mod error;
pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
