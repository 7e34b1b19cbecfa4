#![allow(dead_code)]

use std::sync::Arc;

use catalog_server::{Config, LocalImageStore, ServerState};
use shared::models::{BrandCreate, CategoryCreate, ProductCreate, ProductImageCreate};

/// State over an in-memory database with images stored under `dir`
pub async fn test_state(dir: &tempfile::TempDir) -> ServerState {
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let store = LocalImageStore::new(dir.path(), "http://localhost/images", 1024 * 1024);
    ServerState::in_memory(config, Arc::new(store))
        .await
        .unwrap()
}

pub fn category(name: &str, parent_id: Option<i64>) -> CategoryCreate {
    CategoryCreate {
        name: name.into(),
        parent_id,
        ..Default::default()
    }
}

/// Category "Phones" and brand "Acme"
pub async fn seed(state: &ServerState) -> (i64, i64) {
    let category = state
        .catalog
        .create_category(category("Phones", None))
        .await
        .unwrap();
    let brand = state
        .catalog
        .create_brand(BrandCreate {
            name: "Acme".into(),
            slug: None,
        })
        .await
        .unwrap();
    (category.id, brand.id)
}

/// Product payload with images ordered 1..n
pub fn product(category_id: i64, brand_id: i64, urls: &[&str]) -> ProductCreate {
    ProductCreate {
        name: "Pixel".into(),
        description: None,
        category_id,
        brand_id,
        initial_stock: 1,
        images: urls
            .iter()
            .enumerate()
            .map(|(i, url)| ProductImageCreate {
                sort_order: i as i32 + 1,
                ..ProductImageCreate::new(*url)
            })
            .collect(),
    }
}
