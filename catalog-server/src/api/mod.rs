//! API routes
//!
//! - [`health`] - health check
//! - [`categories`] - category hierarchy
//! - [`brands`] - brands
//! - [`products`] - products
//! - [`images`] - product images
//!
//! Every handler answers with the `ApiResponse` envelope; errors map through
//! `AppError`.

pub mod brands;
pub mod categories;
pub mod health;
pub mod images;
pub mod products;

use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// `?active_only=true` filter shared by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(categories::router())
        .merge(brands::router())
        .merge(products::router())
        .merge(images::router())
}

/// Router with middleware; state is attached by the caller
pub fn build_app() -> Router<ServerState> {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
