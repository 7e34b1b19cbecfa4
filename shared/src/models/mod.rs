//! Data models
//!
//! Shared between catalog-server and the admin console (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod brand;
pub mod category;
pub mod product;
pub mod product_image;

// Re-exports
pub use brand::*;
pub use category::*;
pub use product::*;
pub use product_image::*;
