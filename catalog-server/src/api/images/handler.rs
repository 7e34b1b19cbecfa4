//! Product Image API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};

use crate::api::ListQuery;
use crate::core::ServerState;
use crate::services::ImageUpload;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    ImageOrder, ProductImage, ProductImageBatchItem, ProductImageCreate, ProductImageUpdate,
    ProductImageUrls,
};

/// GET /api/products/{product_id}/images
pub async fn list(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ProductImage>>> {
    let images = state
        .catalog
        .list_product_images(product_id, query.active_only)
        .await?;
    Ok(ApiResponse::success(images))
}

/// POST /api/products/{product_id}/images
pub async fn create(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<ProductImageCreate>,
) -> AppResult<ApiResponse<ProductImage>> {
    let image = state.catalog.create_image(product_id, payload).await?;
    Ok(ApiResponse::success_with_message("Image created", image))
}

/// POST /api/products/{product_id}/images/urls
pub async fn add_urls(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<ProductImageUrls>,
) -> AppResult<ApiResponse<Vec<ProductImage>>> {
    let images = state
        .catalog
        .add_images(product_id, payload.variant_id, Vec::new(), payload.urls)
        .await?;
    Ok(ApiResponse::success(images))
}

/// POST /api/products/{product_id}/images/upload
///
/// Multipart form: any number of `file` parts plus an optional
/// `variant_id` text part.
pub async fn upload(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<Vec<ProductImage>>> {
    let mut uploads = Vec::new();
    let mut variant_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("variant_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Invalid variant_id: {e}")))?;
                let id = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::validation(format!("Invalid variant_id: {text}")))?;
                variant_id = Some(id);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read file: {e}")))?;
                uploads.push(ImageUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    if uploads.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    let images = state
        .catalog
        .add_images(product_id, variant_id, uploads, Vec::new())
        .await?;
    Ok(ApiResponse::success(images))
}

/// POST /api/products/{product_id}/images/batch
pub async fn create_batch(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<Vec<ProductImageCreate>>,
) -> AppResult<ApiResponse<Vec<ProductImage>>> {
    Ok(ApiResponse::success(
        state.catalog.create_images(product_id, payload).await?,
    ))
}

/// PUT /api/products/{product_id}/images/batch
pub async fn update_batch(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<Vec<ProductImageBatchItem>>,
) -> AppResult<ApiResponse<Vec<ProductImage>>> {
    Ok(ApiResponse::success(
        state.catalog.update_images(product_id, payload).await?,
    ))
}

/// PUT /api/products/{product_id}/images/order - returns rows updated
pub async fn reorder(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<Vec<ImageOrder>>,
) -> AppResult<ApiResponse<u64>> {
    Ok(ApiResponse::success(
        state.catalog.reorder_images(product_id, &payload).await?,
    ))
}

/// GET /api/products/{product_id}/images/principal
pub async fn principal(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
) -> AppResult<ApiResponse<Option<ProductImage>>> {
    Ok(ApiResponse::success(
        state.catalog.principal_image(product_id).await?,
    ))
}

/// GET /api/products/{product_id}/images/{image_id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<ProductImage>> {
    Ok(ApiResponse::success(
        state.catalog.get_image(product_id, image_id).await?,
    ))
}

/// PUT /api/products/{product_id}/images/{image_id}
pub async fn update(
    State(state): State<ServerState>,
    Path((product_id, image_id)): Path<(i64, i64)>,
    Json(payload): Json<ProductImageUpdate>,
) -> AppResult<ApiResponse<ProductImage>> {
    let image = state
        .catalog
        .update_image(product_id, image_id, payload)
        .await?;
    Ok(ApiResponse::success(image))
}

/// DELETE /api/products/{product_id}/images/{image_id}
pub async fn delete(
    State(state): State<ServerState>,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<bool>> {
    Ok(ApiResponse::success(
        state.catalog.delete_image(product_id, image_id).await?,
    ))
}

/// PUT /api/products/{product_id}/images/{image_id}/principal
pub async fn set_principal(
    State(state): State<ServerState>,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<bool>> {
    let updated = state
        .catalog
        .set_principal_image(product_id, image_id)
        .await?;
    if !updated {
        return Err(AppError::with_message(
            ErrorCode::ImageNotFound,
            format!("Image {image_id} not found"),
        ));
    }
    Ok(ApiResponse::success(true))
}

/// PUT /api/products/{product_id}/images/{image_id}/toggle-active
pub async fn toggle_active(
    State(state): State<ServerState>,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<bool>> {
    Ok(ApiResponse::success(
        state
            .catalog
            .toggle_image_active(product_id, image_id)
            .await?,
    ))
}
