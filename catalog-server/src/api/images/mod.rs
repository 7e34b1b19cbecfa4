//! Product Image API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/products/{id}/images | GET / POST | list / create one |
//! | /api/products/{id}/images/urls | POST | add external URLs |
//! | /api/products/{id}/images/upload | POST | add uploaded files (multipart) |
//! | /api/products/{id}/images/batch | POST / PUT | batch create / batch update |
//! | /api/products/{id}/images/order | PUT | apply `{id, sort_order}` pairs |
//! | /api/products/{id}/images/principal | GET | display image |
//! | /api/products/{id}/images/{image_id} | GET / PUT / DELETE | single image |
//! | /api/products/{id}/images/{image_id}/principal | PUT | set principal |
//! | /api/products/{id}/images/{image_id}/toggle-active | PUT | flip active flag |

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Request body cap for multipart uploads; each file is checked again by the store
const MAX_MULTIPART_BYTES: usize = 32 * 1024 * 1024;

const BASE: &str = "/api/products/{product_id}/images";

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(BASE, get(handler::list).post(handler::create))
        .route(&format!("{BASE}/urls"), post(handler::add_urls))
        .route(
            &format!("{BASE}/upload"),
            post(handler::upload).layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES)),
        )
        .route(
            &format!("{BASE}/batch"),
            post(handler::create_batch).put(handler::update_batch),
        )
        .route(&format!("{BASE}/order"), put(handler::reorder))
        .route(&format!("{BASE}/principal"), get(handler::principal))
        .route(
            &format!("{BASE}/{{image_id}}"),
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route(
            &format!("{BASE}/{{image_id}}/principal"),
            put(handler::set_principal),
        )
        .route(
            &format!("{BASE}/{{image_id}}/toggle-active"),
            put(handler::toggle_active),
        )
}
