//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories form a forest through `parent_id`; roots have no parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    /// URL-safe identifier, unique across active and inactive rows
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    /// Slug hint; derived from `name` when absent
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update category payload (full replacement of the editable fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: String,
    pub description: Option<String>,
    /// `None` turns the category into a root
    pub parent_id: Option<i64>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Move category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMove {
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Bulk activate / deactivate payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBulkStatus {
    pub ids: Vec<i64>,
    pub is_active: bool,
}

/// Id list payload used by bulk delete and reorder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryIds {
    pub ids: Vec<i64>,
}

/// A node of the reconstructed category forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
    /// Depth in the forest, roots are level 0
    pub level: u32,
    /// Number of active products directly assigned to this category
    pub product_count: i64,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn from_category(category: Category, level: u32, product_count: i64) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            description: category.description,
            image_url: category.image_url,
            icon: category.icon,
            slug: category.slug,
            sort_order: category.sort_order,
            is_active: category.is_active,
            level,
            product_count,
            children: Vec::new(),
        }
    }
}

/// One step of a breadcrumb trail (trails are ordered root first)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbItem {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Result of retiring a category or brand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetireOutcome {
    /// Active dependents exist; the row was kept with `is_active = false`
    Deactivated,
    /// No active dependents; the row was removed
    Deleted,
}
