//! Product Image Model

use serde::{Deserialize, Serialize};

/// Product image entity
///
/// Images are grouped by `(product_id, variant_id)`; `variant_id = None`
/// is a group of its own. Each non-empty group keeps one principal image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    /// Unique across the whole image table
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_principal: bool,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create image payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageCreate {
    pub variant_id: Option<i64>,
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_principal: bool,
    #[serde(default = "default_order")]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ProductImageCreate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            variant_id: None,
            url: url.into(),
            alt_text: None,
            is_principal: false,
            sort_order: default_order(),
            is_active: true,
        }
    }
}

/// Update image payload (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductImageUpdate {
    pub url: Option<String>,
    pub alt_text: Option<String>,
    pub sort_order: Option<i32>,
    pub is_principal: Option<bool>,
    pub is_active: Option<bool>,
}

/// One item of a batch update: create (no id), update, or soft-remove (`delete`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageBatchItem {
    pub id: Option<i64>,
    pub variant_id: Option<i64>,
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_principal: bool,
    #[serde(default = "default_order")]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub delete: bool,
}

/// `{id, sort_order}` pair for reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOrder {
    pub id: i64,
    pub sort_order: i32,
}

/// Add images by external URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageUrls {
    pub urls: Vec<String>,
    pub variant_id: Option<i64>,
}

fn default_order() -> i32 {
    1
}

fn default_true() -> bool {
    true
}
