//! Brand Model

use serde::{Deserialize, Serialize};

/// Brand entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create brand payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandCreate {
    pub name: String,
    pub slug: Option<String>,
}
