//! Product Model

use serde::{Deserialize, Serialize};

use super::product_image::{ProductImage, ProductImageCreate};

/// Product entity (only the fields the catalog core touches)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub brand_id: i64,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub brand_id: i64,
    /// Initial stock quantity for the inventory row
    #[serde(default)]
    pub initial_stock: i64,
    /// Initial image batch (at least one)
    #[serde(default)]
    pub images: Vec<ProductImageCreate>,
}

/// Product with its images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFull {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub principal_image: Option<ProductImage>,
    pub stock: i64,
}
