//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{ProductCreate, ProductFull};

/// POST /api/products - product, initial images and stock in one go
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<ApiResponse<ProductFull>> {
    let product = state.catalog.create_product(payload).await?;
    Ok(ApiResponse::success_with_message("Product created", product))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<ProductFull>> {
    Ok(ApiResponse::success(state.catalog.get_product(id).await?))
}

/// DELETE /api/products/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<bool>> {
    if !state.catalog.delete_product(id).await? {
        return Err(AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("Product {id} not found"),
        ));
    }
    Ok(ApiResponse::success(true))
}
