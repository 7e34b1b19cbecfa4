//! Category API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::ListQuery;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    BreadcrumbItem, Category, CategoryBulkStatus, CategoryCreate, CategoryIds, CategoryMove,
    CategoryNode, CategoryUpdate, Product, RetireOutcome,
};

/// GET /api/categories - flat list sorted by order, then name
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<Category>>> {
    let categories = state.catalog.list_categories(query.active_only).await?;
    Ok(ApiResponse::success(categories))
}

/// GET /api/categories/tree - nested forest
pub async fn tree(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<CategoryNode>>> {
    let tree = state.catalog.category_tree(query.active_only).await?;
    Ok(ApiResponse::success(tree))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Category>> {
    Ok(ApiResponse::success(state.catalog.get_category(id).await?))
}

/// GET /api/categories/slug/{slug}
pub async fn get_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<Category>> {
    Ok(ApiResponse::success(
        state.catalog.get_category_by_slug(&slug).await?,
    ))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<ApiResponse<Category>> {
    let category = state.catalog.create_category(payload).await?;
    Ok(ApiResponse::success_with_message("Category created", category))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<ApiResponse<Category>> {
    let category = state.catalog.update_category(id, payload).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /api/categories/{id}
///
/// A category with active children or products is deactivated instead of
/// removed; the outcome tells which one happened.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<RetireOutcome>> {
    let outcome = state.catalog.retire_category(id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
    })?;
    let message = match outcome {
        RetireOutcome::Deactivated => "Category deactivated (it still has active dependents)",
        RetireOutcome::Deleted => "Category deleted",
    };
    Ok(ApiResponse::success_with_message(message, outcome))
}

/// PUT /api/categories/{id}/move - `false` when the move is not allowed
pub async fn move_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryMove>,
) -> AppResult<ApiResponse<bool>> {
    let moved = state
        .catalog
        .move_category(id, payload.parent_id, payload.sort_order)
        .await?;
    Ok(ApiResponse::success(moved))
}

/// GET /api/categories/{id}/breadcrumb
///
/// Ordered from the root down; the last item is the requested category.
pub async fn breadcrumb(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<BreadcrumbItem>>> {
    Ok(ApiResponse::success(state.catalog.breadcrumb(id).await?))
}

/// GET /api/categories/{id}/descendants
pub async fn descendants(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<i64>>> {
    Ok(ApiResponse::success(state.catalog.descendant_ids(id).await?))
}

/// GET /api/categories/{id}/products - active products of the category
pub async fn products(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    Ok(ApiResponse::success(
        state.catalog.list_products_by_category(id).await?,
    ))
}

/// PUT /api/categories/reorder - order = position in `ids`
pub async fn reorder(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryIds>,
) -> AppResult<ApiResponse<u64>> {
    Ok(ApiResponse::success(
        state.catalog.reorder_categories(&payload.ids).await?,
    ))
}

/// POST /api/categories/bulk-status
pub async fn bulk_status(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryBulkStatus>,
) -> AppResult<ApiResponse<u64>> {
    let count = state
        .catalog
        .bulk_toggle_categories(&payload.ids, payload.is_active)
        .await?;
    Ok(ApiResponse::success(count))
}

/// POST /api/categories/bulk-delete
pub async fn bulk_delete(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryIds>,
) -> AppResult<ApiResponse<u64>> {
    Ok(ApiResponse::success(
        state.catalog.bulk_delete_categories(&payload.ids).await?,
    ))
}
