//! Service layer
//!
//! - [`CatalogService`] - categories, brands, products and images
//! - [`ImageStore`] / [`LocalImageStore`] - image file storage

pub mod catalog_service;
pub mod image_store;

pub use catalog_service::{CatalogService, ImageUpload};
pub use image_store::{ImageStore, LocalImageStore};
