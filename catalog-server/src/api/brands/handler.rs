//! Brand API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::ListQuery;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{Brand, BrandCreate, RetireOutcome};

/// GET /api/brands
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<Brand>>> {
    Ok(ApiResponse::success(
        state.catalog.list_brands(query.active_only).await?,
    ))
}

/// GET /api/brands/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Brand>> {
    Ok(ApiResponse::success(state.catalog.get_brand(id).await?))
}

/// POST /api/brands
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BrandCreate>,
) -> AppResult<ApiResponse<Brand>> {
    let brand = state.catalog.create_brand(payload).await?;
    Ok(ApiResponse::success_with_message("Brand created", brand))
}

/// DELETE /api/brands/{id} - deactivates while products reference the brand
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<RetireOutcome>> {
    Ok(ApiResponse::success(state.catalog.retire_brand(id).await?))
}
