//! Catalog Service - categories, brands, products and product images
//!
//! Composition layer over the hierarchy and image engines. Owns the
//! cross-entity rules (a product keeps at least one image, products need an
//! active category and brand) and the file lifecycle around the image store.
//! Each method is one logical operation on one pooled connection.

use sqlx::pool::PoolConnection;
use sqlx::{Connection, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;

use super::image_store::ImageStore;
use crate::catalog::{hierarchy, images};
use crate::db::repository::{
    RepoError, RepoResult, brand, category, inventory, product, product_image,
};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_image_order,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    Brand, BrandCreate, BreadcrumbItem, Category, CategoryCreate, CategoryNode, CategoryUpdate,
    ImageOrder, Product, ProductCreate, ProductFull, ProductImage, ProductImageBatchItem,
    ProductImageCreate, ProductImageUpdate, RetireOutcome,
};
use shared::util::slugify_or_default;

/// A file received from a client, not yet stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Unified catalog service
#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
    image_store: Arc<dyn ImageStore>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

fn validate_category_fields(
    name: &str,
    description: &Option<String>,
    slug: &Option<String>,
    image_url: &Option<String>,
    icon: &Option<String>,
) -> AppResult<()> {
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    validate_optional_text(description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(slug, "slug", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(image_url, "image_url", MAX_URL_LEN)?;
    validate_optional_text(icon, "icon", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

fn validate_image_fields(url: &str, alt_text: &Option<String>, sort_order: i32) -> AppResult<()> {
    validate_required_text(url, "url", MAX_URL_LEN)?;
    validate_optional_text(alt_text, "alt_text", MAX_NOTE_LEN)?;
    validate_image_order(sort_order)
}

fn product_not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::ProductNotFound, format!("Product {id} not found"))
}

async fn require_product(conn: &mut SqliteConnection, id: i64) -> RepoResult<Product> {
    product::find_by_id(conn, id)
        .await?
        .ok_or_else(|| product_not_found(id))
}

impl CatalogService {
    pub fn new(pool: SqlitePool, image_store: Arc<dyn ImageStore>) -> Self {
        Self { pool, image_store }
    }

    pub fn image_store(&self) -> &Arc<dyn ImageStore> {
        &self.image_store
    }

    async fn conn(&self) -> AppResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await.map_err(RepoError::from)?)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn create_category(&self, data: CategoryCreate) -> AppResult<Category> {
        validate_category_fields(
            &data.name,
            &data.description,
            &data.slug,
            &data.image_url,
            &data.icon,
        )?;
        let mut conn = self.conn().await?;
        Ok(hierarchy::create(&mut conn, data).await?)
    }

    pub async fn update_category(&self, id: i64, data: CategoryUpdate) -> AppResult<Category> {
        validate_category_fields(
            &data.name,
            &data.description,
            &data.slug,
            &data.image_url,
            &data.icon,
        )?;
        let mut conn = self.conn().await?;
        Ok(hierarchy::update(&mut conn, id, data).await?)
    }

    pub async fn move_category(
        &self,
        id: i64,
        parent_id: Option<i64>,
        sort_order: i32,
    ) -> AppResult<bool> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::move_category(&mut conn, id, parent_id, sort_order).await?)
    }

    pub async fn retire_category(&self, id: i64) -> AppResult<Option<RetireOutcome>> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::retire(&mut conn, id).await?)
    }

    pub async fn get_category(&self, id: i64) -> AppResult<Category> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::get_by_id(&mut conn, id).await?)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> AppResult<Category> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::get_by_slug(&mut conn, slug).await?)
    }

    pub async fn list_categories(&self, active_only: bool) -> AppResult<Vec<Category>> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::list(&mut conn, active_only).await?)
    }

    pub async fn category_tree(&self, active_only: bool) -> AppResult<Vec<CategoryNode>> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::get_tree(&mut conn, active_only).await?)
    }

    /// Ancestor trail ordered root first, ending with `id`
    pub async fn breadcrumb(&self, id: i64) -> AppResult<Vec<BreadcrumbItem>> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::breadcrumb(&mut conn, id).await?)
    }

    pub async fn descendant_ids(&self, id: i64) -> AppResult<Vec<i64>> {
        let mut conn = self.conn().await?;
        hierarchy::get_by_id(&mut conn, id).await?;
        Ok(hierarchy::descendant_ids(&mut conn, id).await?)
    }

    pub async fn is_valid_parent(&self, id: i64, parent_id: Option<i64>) -> AppResult<bool> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::is_valid_parent(&mut conn, id, parent_id).await?)
    }

    pub async fn bulk_toggle_categories(&self, ids: &[i64], is_active: bool) -> AppResult<u64> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::bulk_toggle_status(&mut conn, ids, is_active).await?)
    }

    pub async fn bulk_delete_categories(&self, ids: &[i64]) -> AppResult<u64> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::bulk_delete(&mut conn, ids).await?)
    }

    pub async fn reorder_categories(&self, ordered_ids: &[i64]) -> AppResult<u64> {
        let mut conn = self.conn().await?;
        Ok(hierarchy::reorder(&mut conn, ordered_ids).await?)
    }

    // =========================================================================
    // Brands
    // =========================================================================

    pub async fn create_brand(&self, data: BrandCreate) -> AppResult<Brand> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.slug, "slug", MAX_SHORT_TEXT_LEN)?;

        let mut conn = self.conn().await?;
        let mut tx = conn.begin().await.map_err(RepoError::from)?;

        if brand::find_active_by_name_ci(&mut tx, &data.name).await?.is_some() {
            return Err(AppError::with_message(
                ErrorCode::BrandNameExists,
                format!("Brand '{}' already exists", data.name.trim()),
            ));
        }
        let base = slugify_or_default(data.slug.as_deref().unwrap_or(&data.name));
        let slug = brand::next_free_slug(&mut tx, &base).await?;
        let id = brand::insert(&mut tx, &data.name, &slug).await?;
        let created = brand::find_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::database("Failed to create brand"))?;

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(brand_id = id, "Brand created");
        Ok(created)
    }

    pub async fn get_brand(&self, id: i64) -> AppResult<Brand> {
        let mut conn = self.conn().await?;
        brand::find_by_id(&mut conn, id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::BrandNotFound, format!("Brand {id} not found"))
        })
    }

    pub async fn list_brands(&self, active_only: bool) -> AppResult<Vec<Brand>> {
        let mut conn = self.conn().await?;
        Ok(brand::find_all(&mut conn, active_only).await?)
    }

    /// Deactivate a brand still referenced by products, delete it otherwise
    pub async fn retire_brand(&self, id: i64) -> AppResult<RetireOutcome> {
        let mut conn = self.conn().await?;
        let mut tx = conn.begin().await.map_err(RepoError::from)?;

        if brand::find_by_id(&mut tx, id).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::BrandNotFound,
                format!("Brand {id} not found"),
            ));
        }
        let outcome = if brand::count_products(&mut tx, id).await? > 0 {
            brand::set_active(&mut tx, id, false).await?;
            RetireOutcome::Deactivated
        } else {
            brand::hard_delete(&mut tx, id).await?;
            RetireOutcome::Deleted
        };

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(brand_id = id, outcome = ?outcome, "Brand retired");
        Ok(outcome)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Product row, image batch and inventory row in one transaction
    pub async fn create_product(&self, data: ProductCreate) -> AppResult<ProductFull> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        if data.images.is_empty() {
            return Err(AppError::validation("A product needs at least one image"));
        }
        for image in &data.images {
            validate_image_fields(&image.url, &image.alt_text, image.sort_order)?;
        }
        if data.initial_stock < 0 {
            return Err(AppError::validation("initial_stock must not be negative"));
        }

        let mut conn = self.conn().await?;
        let mut tx = conn.begin().await.map_err(RepoError::from)?;

        match category::find_by_id(&mut tx, data.category_id).await? {
            Some(c) if c.is_active => {}
            Some(_) => {
                return Err(AppError::validation(format!(
                    "Category {} is inactive",
                    data.category_id
                )));
            }
            None => {
                return Err(AppError::with_message(
                    ErrorCode::CategoryNotFound,
                    format!("Category {} not found", data.category_id),
                ));
            }
        }
        match brand::find_by_id(&mut tx, data.brand_id).await? {
            Some(b) if b.is_active => {}
            Some(_) => {
                return Err(AppError::validation(format!(
                    "Brand {} is inactive",
                    data.brand_id
                )));
            }
            None => {
                return Err(AppError::with_message(
                    ErrorCode::BrandNotFound,
                    format!("Brand {} not found", data.brand_id),
                ));
            }
        }

        let product_id = product::insert(&mut tx, &data).await?;
        images::create_multiple(&mut tx, product_id, data.images).await?;
        inventory::insert(&mut tx, product_id, data.initial_stock).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(product_id, "Product created");
        Ok(Self::load_product(&mut conn, product_id).await?)
    }

    async fn load_product(conn: &mut SqliteConnection, id: i64) -> RepoResult<ProductFull> {
        let product = require_product(conn, id).await?;
        let images = images::list_by_product(conn, id, false).await?;
        let principal_image = images::get_principal(conn, id).await?;
        let stock = inventory::quantity(conn, id).await?;
        Ok(ProductFull {
            product,
            images,
            principal_image,
            stock,
        })
    }

    pub async fn get_product(&self, id: i64) -> AppResult<ProductFull> {
        let mut conn = self.conn().await?;
        Ok(Self::load_product(&mut conn, id).await?)
    }

    pub async fn list_products_by_category(&self, category_id: i64) -> AppResult<Vec<Product>> {
        let mut conn = self.conn().await?;
        hierarchy::get_by_id(&mut conn, category_id).await?;
        Ok(product::find_by_category(&mut conn, category_id).await?)
    }

    /// Soft delete; returns `false` when the product does not exist
    pub async fn delete_product(&self, id: i64) -> AppResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = product::set_active(&mut conn, id, false).await?;
        if deleted {
            tracing::info!(product_id = id, "Product deactivated");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Product images
    // =========================================================================

    pub async fn list_product_images(
        &self,
        product_id: i64,
        active_only: bool,
    ) -> AppResult<Vec<ProductImage>> {
        let mut conn = self.conn().await?;
        require_product(&mut conn, product_id).await?;
        Ok(images::list_by_product(&mut conn, product_id, active_only).await?)
    }

    pub async fn get_image(&self, product_id: i64, image_id: i64) -> AppResult<ProductImage> {
        let mut conn = self.conn().await?;
        let image = images::get_by_id(&mut conn, image_id).await?;
        if image.product_id != product_id {
            return Err(AppError::with_message(
                ErrorCode::ImageNotInProduct,
                format!("Image {image_id} does not belong to product {product_id}"),
            ));
        }
        Ok(image)
    }

    pub async fn principal_image(&self, product_id: i64) -> AppResult<Option<ProductImage>> {
        let mut conn = self.conn().await?;
        require_product(&mut conn, product_id).await?;
        Ok(images::get_principal(&mut conn, product_id).await?)
    }

    pub async fn create_image(
        &self,
        product_id: i64,
        data: ProductImageCreate,
    ) -> AppResult<ProductImage> {
        validate_image_fields(&data.url, &data.alt_text, data.sort_order)?;
        let mut conn = self.conn().await?;
        Ok(images::create(&mut conn, product_id, data).await?)
    }

    pub async fn update_image(
        &self,
        product_id: i64,
        image_id: i64,
        data: ProductImageUpdate,
    ) -> AppResult<ProductImage> {
        if let Some(url) = &data.url {
            validate_required_text(url, "url", MAX_URL_LEN)?;
        }
        validate_optional_text(&data.alt_text, "alt_text", MAX_NOTE_LEN)?;
        if let Some(sort_order) = data.sort_order {
            validate_image_order(sort_order)?;
        }
        self.get_image(product_id, image_id).await?;
        let mut conn = self.conn().await?;
        Ok(images::update(&mut conn, image_id, data).await?)
    }

    pub async fn set_principal_image(&self, product_id: i64, image_id: i64) -> AppResult<bool> {
        let mut conn = self.conn().await?;
        Ok(images::set_principal(&mut conn, product_id, image_id).await?)
    }

    pub async fn toggle_image_active(&self, product_id: i64, image_id: i64) -> AppResult<bool> {
        self.get_image(product_id, image_id).await?;
        let mut conn = self.conn().await?;
        Ok(images::toggle_active(&mut conn, image_id).await?)
    }

    pub async fn reorder_images(&self, product_id: i64, pairs: &[ImageOrder]) -> AppResult<u64> {
        let mut conn = self.conn().await?;
        require_product(&mut conn, product_id).await?;
        Ok(images::update_order(&mut conn, product_id, pairs).await?)
    }

    pub async fn create_images(
        &self,
        product_id: i64,
        items: Vec<ProductImageCreate>,
    ) -> AppResult<Vec<ProductImage>> {
        for item in &items {
            validate_image_fields(&item.url, &item.alt_text, item.sort_order)?;
        }
        let mut conn = self.conn().await?;
        Ok(images::create_multiple(&mut conn, product_id, items).await?)
    }

    pub async fn update_images(
        &self,
        product_id: i64,
        items: Vec<ProductImageBatchItem>,
    ) -> AppResult<Vec<ProductImage>> {
        for item in items.iter().filter(|i| !i.delete) {
            validate_image_fields(&item.url, &item.alt_text, item.sort_order)?;
        }
        let mut conn = self.conn().await?;
        Ok(images::update_multiple(&mut conn, product_id, items).await?)
    }

    /// Delete an image, refusing to remove the last one of a product.
    ///
    /// The stored file is removed after commit; failures there are logged
    /// and do not undo the delete.
    pub async fn delete_image(&self, product_id: i64, image_id: i64) -> AppResult<bool> {
        let mut conn = self.conn().await?;
        let mut tx = conn.begin().await.map_err(RepoError::from)?;

        let image = images::get_by_id(&mut tx, image_id).await?;
        if image.product_id != product_id {
            return Err(AppError::with_message(
                ErrorCode::ImageNotInProduct,
                format!("Image {image_id} does not belong to product {product_id}"),
            ));
        }
        if product_image::count_by_product(&mut tx, product_id).await? <= 1 {
            return Err(RepoError::business_rule(
                ErrorCode::ProductLastImage,
                format!("Product {product_id} must keep at least one image"),
            )
            .into());
        }
        let deleted = images::delete(&mut tx, image_id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        if deleted {
            self.remove_stored_file(&mut conn, &image.url).await;
        }
        Ok(deleted)
    }

    /// Add uploaded files and external URLs to a product's image group.
    ///
    /// Orders continue after the images already in the group; the first new
    /// image becomes principal only when the group was empty. Files stored
    /// for a batch that fails are removed again.
    pub async fn add_images(
        &self,
        product_id: i64,
        variant_id: Option<i64>,
        uploads: Vec<ImageUpload>,
        urls: Vec<String>,
    ) -> AppResult<Vec<ProductImage>> {
        for url in &urls {
            validate_required_text(url, "url", MAX_URL_LEN)?;
        }
        if uploads.is_empty() && urls.is_empty() {
            return Err(AppError::validation("No images to add"));
        }

        let mut conn = self.conn().await?;
        require_product(&mut conn, product_id).await?;

        let mut uploaded = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            match self.image_store.upload(&upload.bytes, &upload.file_name).await {
                Ok(url) => uploaded.push(url),
                Err(e) => {
                    self.discard_uploads(&mut conn, &uploaded).await;
                    return Err(e);
                }
            }
        }

        let all_urls: Vec<String> = uploaded.iter().cloned().chain(urls).collect();
        match Self::append_to_group(&mut conn, product_id, variant_id, all_urls).await {
            Ok(images) => Ok(images),
            Err(e) => {
                self.discard_uploads(&mut conn, &uploaded).await;
                Err(e.into())
            }
        }
    }

    async fn append_to_group(
        conn: &mut SqliteConnection,
        product_id: i64,
        variant_id: Option<i64>,
        urls: Vec<String>,
    ) -> RepoResult<Vec<ProductImage>> {
        let mut tx = conn.begin().await?;
        let existing = product_image::list_group(&mut tx, product_id, variant_id)
            .await?
            .len();

        let mut items = Vec::with_capacity(urls.len());
        for (index, url) in urls.into_iter().enumerate() {
            let sort_order = i32::try_from(existing + index + 1)
                .map_err(|_| RepoError::validation("Too many images"))?;
            items.push(ProductImageCreate {
                variant_id,
                is_principal: existing == 0 && index == 0,
                sort_order,
                ..ProductImageCreate::new(url)
            });
        }

        let images = images::create_multiple(&mut tx, product_id, items).await?;
        tx.commit().await?;
        Ok(images)
    }

    /// Remove files of a failed batch that no row references
    async fn discard_uploads(&self, conn: &mut SqliteConnection, urls: &[String]) {
        for url in urls {
            self.remove_stored_file(conn, url).await;
        }
    }

    /// Best-effort removal of a locally stored file once no row uses it
    async fn remove_stored_file(&self, conn: &mut SqliteConnection, url: &str) {
        let Some(path) = self.image_store.path_from_url(url) else {
            return;
        };
        match product_image::find_by_url(conn, url).await {
            Ok(None) => {}
            Ok(Some(_)) => return,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Could not check image references, keeping file");
                return;
            }
        }
        if let Err(e) = self.image_store.delete(&path).await {
            tracing::warn!(url = %url, error = %e, "Failed to delete image file");
        }
    }
}
