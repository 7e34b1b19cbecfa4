//! Category API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/categories | GET / POST | list (`?active_only`) / create |
//! | /api/categories/tree | GET | nested forest with levels and product counts |
//! | /api/categories/reorder | PUT | `sort_order` = position in `ids` |
//! | /api/categories/bulk-status | POST | activate / deactivate many |
//! | /api/categories/bulk-delete | POST | retire many |
//! | /api/categories/slug/{slug} | GET | lookup by slug |
//! | /api/categories/{id} | GET / PUT / DELETE | single category; DELETE answers `deactivated` or `deleted` |
//! | /api/categories/{id}/move | PUT | re-parent, `false` when refused |
//! | /api/categories/{id}/breadcrumb | GET | ancestors ordered root first, ending with `{id}` |
//! | /api/categories/{id}/descendants | GET | ids below `{id}` |
//! | /api/categories/{id}/products | GET | active products of the category |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Fixed paths before /{id} to avoid path conflicts
        .route("/tree", get(handler::tree))
        .route("/reorder", put(handler::reorder))
        .route("/bulk-status", post(handler::bulk_status))
        .route("/bulk-delete", post(handler::bulk_delete))
        .route("/slug/{slug}", get(handler::get_by_slug))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/move", put(handler::move_category))
        .route("/{id}/breadcrumb", get(handler::breadcrumb))
        .route("/{id}/descendants", get(handler::descendants))
        .route("/{id}/products", get(handler::products))
}
