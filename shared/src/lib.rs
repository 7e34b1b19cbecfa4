//! Shared types for the catalog backend
//!
//! Wire models, the unified error system and small utilities used by
//! `catalog-server` and by API consumers.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
