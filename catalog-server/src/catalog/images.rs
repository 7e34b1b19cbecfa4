//! Product image engine
//!
//! Keeps one principal per `(product_id, variant_id)` group while images are
//! created, edited, reordered and removed. Group repairs (clear-then-set,
//! promotion after delete) run inside one transaction opened on the
//! connection handed in by the caller.

use crate::db::repository::{RepoError, RepoResult, product, product_image as repo};
use shared::error::ErrorCode;
use shared::models::{
    ImageOrder, ProductImage, ProductImageBatchItem, ProductImageCreate, ProductImageUpdate,
};
use sqlx::{Connection, SqliteConnection};
use std::collections::HashSet;

type Group = (i64, Option<i64>);

fn image_not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::ImageNotFound, format!("Image {id} not found"))
}

fn not_in_product(image_id: i64, product_id: i64) -> RepoError {
    RepoError::validation_code(
        ErrorCode::ImageNotInProduct,
        format!("Image {image_id} does not belong to product {product_id}"),
    )
}

fn validate_fields(url: &str, sort_order: i32, is_principal: bool, is_active: bool) -> RepoResult<()> {
    if url.trim().is_empty() {
        return Err(RepoError::validation("Image url must not be empty"));
    }
    if sort_order < 1 {
        return Err(RepoError::validation(format!(
            "Image order must be positive (got {sort_order})"
        )));
    }
    if is_principal && !is_active {
        return Err(RepoError::validation(
            "An inactive image cannot be the principal image",
        ));
    }
    Ok(())
}

/// Reject a batch that asks for more than one principal
fn ensure_single_principal_request(requested: usize) -> RepoResult<()> {
    if requested > 1 {
        return Err(RepoError::validation_code(
            ErrorCode::ImageMultiplePrincipal,
            format!("Only one image per batch can be principal ({requested} requested)"),
        ));
    }
    Ok(())
}

async fn ensure_url_free(
    conn: &mut SqliteConnection,
    url: &str,
    exclude_id: Option<i64>,
) -> RepoResult<()> {
    if let Some(existing) = repo::find_by_url(conn, url.trim()).await?
        && Some(existing.id) != exclude_id
    {
        return Err(RepoError::duplicate(
            ErrorCode::ImageUrlExists,
            format!("Image url '{}' already exists", url.trim()),
        ));
    }
    Ok(())
}

async fn ensure_product(conn: &mut SqliteConnection, product_id: i64) -> RepoResult<()> {
    if !product::exists(conn, product_id).await? {
        return Err(RepoError::not_found(
            ErrorCode::ProductNotFound,
            format!("Product {product_id} not found"),
        ));
    }
    Ok(())
}

/// Leave the group with exactly one active principal when it has any active
/// image: an existing active principal wins, otherwise the lowest
/// `(sort_order, id)` active image is promoted.
async fn ensure_principal(
    conn: &mut SqliteConnection,
    (product_id, variant_id): Group,
) -> RepoResult<()> {
    let group = repo::list_group(conn, product_id, variant_id).await?;
    let principals: Vec<&ProductImage> = group.iter().filter(|i| i.is_principal).collect();
    let keep = principals
        .iter()
        .find(|i| i.is_active)
        .map(|i| i.id)
        .or_else(|| group.iter().find(|i| i.is_active).map(|i| i.id));

    if principals.len() == 1 && Some(principals[0].id) == keep {
        return Ok(());
    }
    if principals.is_empty() && keep.is_none() {
        return Ok(());
    }

    repo::clear_principal_in_group(conn, product_id, variant_id).await?;
    if let Some(id) = keep {
        repo::set_principal(conn, id).await?;
        tracing::info!(product_id, variant_id = ?variant_id, image_id = id, "Principal image assigned");
    }
    Ok(())
}

/// Insert one row without group repair; callers run `ensure_principal`
async fn insert_one(
    conn: &mut SqliteConnection,
    product_id: i64,
    data: &ProductImageCreate,
) -> RepoResult<i64> {
    validate_fields(&data.url, data.sort_order, data.is_principal, data.is_active)?;
    ensure_url_free(conn, &data.url, None).await?;
    if data.is_principal {
        repo::clear_principal_in_group(conn, product_id, data.variant_id).await?;
    }
    repo::insert(conn, product_id, data).await
}

// =============================================================================
// Queries
// =============================================================================

pub async fn get_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<ProductImage> {
    repo::find_by_id(conn, id)
        .await?
        .ok_or_else(|| image_not_found(id))
}

/// Images of a product ordered by `(sort_order, id)`
pub async fn list_by_product(
    conn: &mut SqliteConnection,
    product_id: i64,
    active_only: bool,
) -> RepoResult<Vec<ProductImage>> {
    repo::list_by_product(conn, product_id, active_only).await
}

/// Display image for a product.
///
/// Prefers the flagged principal; with none flagged the lowest-order active
/// image stands in, so callers always get something to show.
pub async fn get_principal(
    conn: &mut SqliteConnection,
    product_id: i64,
) -> RepoResult<Option<ProductImage>> {
    let principal = repo::find_principal(conn, product_id).await?;
    if let Some(image) = &principal
        && !image.is_principal
    {
        tracing::debug!(product_id, image_id = image.id, "No flagged principal, using fallback");
    }
    Ok(principal)
}

// =============================================================================
// Single-row mutations
// =============================================================================

pub async fn create(
    conn: &mut SqliteConnection,
    product_id: i64,
    data: ProductImageCreate,
) -> RepoResult<ProductImage> {
    let mut tx = conn.begin().await?;
    ensure_product(&mut tx, product_id).await?;

    let id = insert_one(&mut tx, product_id, &data).await?;
    ensure_principal(&mut tx, (product_id, data.variant_id)).await?;
    let image = get_by_id(&mut tx, id).await?;

    tx.commit().await?;
    tracing::info!(product_id, image_id = id, "Image created");
    Ok(image)
}

/// Apply the present fields; setting `is_principal` clears the rest of the
/// group first.
///
/// The principal flag moves by promoting another image: unflagging the
/// principal while it stays active is rejected.
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    data: ProductImageUpdate,
) -> RepoResult<ProductImage> {
    let mut tx = conn.begin().await?;
    let mut image = get_by_id(&mut tx, id).await?;
    let was_principal = image.is_principal;

    if let Some(url) = data.url {
        ensure_url_free(&mut tx, &url, Some(id)).await?;
        image.url = url.trim().to_string();
    }
    if data.alt_text.is_some() {
        image.alt_text = data.alt_text;
    }
    if let Some(sort_order) = data.sort_order {
        image.sort_order = sort_order;
    }
    if let Some(is_active) = data.is_active {
        image.is_active = is_active;
    }
    if let Some(is_principal) = data.is_principal {
        image.is_principal = is_principal;
    }
    if was_principal && image.is_active && data.is_principal == Some(false) {
        return Err(RepoError::validation(format!(
            "Image {id} is the principal image; set another image as principal instead"
        )));
    }
    if !image.is_active && data.is_principal != Some(true) {
        image.is_principal = false;
    }
    validate_fields(&image.url, image.sort_order, image.is_principal, image.is_active)?;

    let group = (image.product_id, image.variant_id);
    if image.is_principal {
        repo::clear_principal_in_group(&mut tx, group.0, group.1).await?;
    }
    repo::update(&mut tx, &image).await?;
    ensure_principal(&mut tx, group).await?;
    let image = get_by_id(&mut tx, id).await?;

    tx.commit().await?;
    Ok(image)
}

/// Hard delete; a removed principal hands over to the lowest-order active
/// image of its group. `false` when the image does not exist.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let mut tx = conn.begin().await?;
    let Some(image) = repo::find_by_id(&mut tx, id).await? else {
        return Ok(false);
    };

    repo::delete(&mut tx, id).await?;
    if image.is_principal {
        match repo::first_active_in_group(&mut tx, image.product_id, image.variant_id).await? {
            Some(next) => {
                repo::set_principal(&mut tx, next.id).await?;
                tracing::info!(
                    product_id = image.product_id,
                    image_id = next.id,
                    "Principal image promoted after delete"
                );
            }
            None => {
                tracing::debug!(product_id = image.product_id, "Image group is now empty");
            }
        }
    }

    tx.commit().await?;
    Ok(true)
}

/// Make `image_id` the principal of its group (re-activating it).
///
/// `false` when the image does not exist; an error when it belongs to
/// another product.
pub async fn set_principal(
    conn: &mut SqliteConnection,
    product_id: i64,
    image_id: i64,
) -> RepoResult<bool> {
    let mut tx = conn.begin().await?;
    let Some(image) = repo::find_by_id(&mut tx, image_id).await? else {
        return Ok(false);
    };
    if image.product_id != product_id {
        return Err(not_in_product(image_id, product_id));
    }

    repo::clear_principal_in_group(&mut tx, product_id, image.variant_id).await?;
    repo::set_principal(&mut tx, image_id).await?;

    tx.commit().await?;
    tracing::info!(product_id, image_id, "Principal image set");
    Ok(true)
}

/// Flip the active flag. Deactivating the principal clears its flag and does
/// not promote another image.
pub async fn toggle_active(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let Some(image) = repo::find_by_id(conn, id).await? else {
        return Ok(false);
    };
    repo::set_active(conn, id, !image.is_active).await
}

// =============================================================================
// Batch mutations
// =============================================================================

/// Insert a batch in one transaction; rejects more than one principal
/// request before writing anything
pub async fn create_multiple(
    conn: &mut SqliteConnection,
    product_id: i64,
    items: Vec<ProductImageCreate>,
) -> RepoResult<Vec<ProductImage>> {
    ensure_single_principal_request(items.iter().filter(|i| i.is_principal).count())?;
    let mut urls = HashSet::new();
    for item in &items {
        if !urls.insert(item.url.trim()) {
            return Err(RepoError::duplicate(
                ErrorCode::ImageUrlExists,
                format!("Image url '{}' appears twice in the batch", item.url.trim()),
            ));
        }
    }

    let mut tx = conn.begin().await?;
    ensure_product(&mut tx, product_id).await?;

    let mut groups: Vec<Group> = Vec::new();
    for item in &items {
        insert_one(&mut tx, product_id, item).await?;
        let group = (product_id, item.variant_id);
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    for group in groups {
        ensure_principal(&mut tx, group).await?;
    }

    let images = repo::list_by_product(&mut tx, product_id, false).await?;
    tx.commit().await?;
    tracing::info!(product_id, count = items.len(), "Image batch created");
    Ok(images)
}

/// Create, update or soft-remove (`delete = true`) images in one
/// transaction. Every touched group keeps a principal afterwards.
pub async fn update_multiple(
    conn: &mut SqliteConnection,
    product_id: i64,
    items: Vec<ProductImageBatchItem>,
) -> RepoResult<Vec<ProductImage>> {
    ensure_single_principal_request(
        items
            .iter()
            .filter(|i| i.is_principal && !i.delete)
            .count(),
    )?;

    let mut tx = conn.begin().await?;
    ensure_product(&mut tx, product_id).await?;

    let mut groups: Vec<Group> = Vec::new();
    for item in items {
        let group = match item.id {
            Some(id) => {
                let mut image = get_by_id(&mut tx, id).await?;
                if image.product_id != product_id {
                    return Err(not_in_product(id, product_id));
                }
                if item.delete {
                    repo::set_active(&mut tx, id, false).await?;
                } else {
                    validate_fields(&item.url, item.sort_order, item.is_principal, item.is_active)?;
                    if item.url.trim() != image.url {
                        ensure_url_free(&mut tx, &item.url, Some(id)).await?;
                    }
                    if item.is_principal {
                        repo::clear_principal_in_group(&mut tx, product_id, image.variant_id)
                            .await?;
                    }
                    image.url = item.url.trim().to_string();
                    image.alt_text = item.alt_text;
                    image.sort_order = item.sort_order;
                    image.is_active = item.is_active;
                    image.is_principal = item.is_principal;
                    repo::update(&mut tx, &image).await?;
                }
                (product_id, image.variant_id)
            }
            None if item.delete => continue,
            None => {
                let data = ProductImageCreate {
                    variant_id: item.variant_id,
                    url: item.url,
                    alt_text: item.alt_text,
                    is_principal: item.is_principal,
                    sort_order: item.sort_order,
                    is_active: item.is_active,
                };
                insert_one(&mut tx, product_id, &data).await?;
                (product_id, data.variant_id)
            }
        };
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    for group in groups {
        ensure_principal(&mut tx, group).await?;
    }

    let images = repo::list_by_product(&mut tx, product_id, false).await?;
    tx.commit().await?;
    Ok(images)
}

/// Apply `{id, sort_order}` pairs; ids of other products or unknown ids are
/// skipped. Returns the number of rows updated.
pub async fn update_order(
    conn: &mut SqliteConnection,
    product_id: i64,
    pairs: &[ImageOrder],
) -> RepoResult<u64> {
    let mut tx = conn.begin().await?;
    let mut count = 0;
    for pair in pairs {
        match repo::find_by_id(&mut tx, pair.id).await? {
            Some(image) if image.product_id == product_id => {
                if pair.sort_order < 1 {
                    return Err(RepoError::validation(format!(
                        "Image order must be positive (got {})",
                        pair.sort_order
                    )));
                }
                if repo::set_order(&mut tx, pair.id, pair.sort_order).await? {
                    count += 1;
                }
            }
            _ => {
                tracing::warn!(product_id, image_id = pair.id, "Skipping reorder of foreign or unknown image");
            }
        }
    }
    tx.commit().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{insert_category, insert_product, test_db};

    fn img(url: &str, sort_order: i32, is_principal: bool) -> ProductImageCreate {
        ProductImageCreate {
            sort_order,
            is_principal,
            ..ProductImageCreate::new(url)
        }
    }

    fn principals(images: &[ProductImage]) -> Vec<i64> {
        images.iter().filter(|i| i.is_principal).map(|i| i.id).collect()
    }

    async fn setup(conn: &mut SqliteConnection) -> i64 {
        let category_id = insert_category(conn, "Phones").await;
        insert_product(conn, category_id, "Pixel").await
    }

    #[tokio::test]
    async fn test_first_image_becomes_principal() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let first = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        assert!(first.is_principal);
        let second = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();
        assert!(!second.is_principal);
    }

    #[tokio::test]
    async fn test_create_principal_clears_group() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, true)).await.unwrap();

        let images = list_by_product(&mut conn, pid, false).await.unwrap();
        assert_eq!(principals(&images), vec![b.id]);
    }

    #[tokio::test]
    async fn test_variant_groups_are_independent() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let base = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let variant = create(
            &mut conn,
            pid,
            ProductImageCreate {
                variant_id: Some(7),
                ..img("v.png", 1, false)
            },
        )
        .await
        .unwrap();
        assert!(base.is_principal);
        assert!(variant.is_principal);

        let principal = get_principal(&mut conn, pid).await.unwrap().unwrap();
        assert_eq!(principal.id, base.id);
    }

    #[tokio::test]
    async fn test_duplicate_url_rejected_globally() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;
        let cat = insert_category(&mut conn, "Other").await;
        let other = insert_product(&mut conn, cat, "Other product").await;

        create(&mut conn, pid, img("same.png", 1, false)).await.unwrap();
        let err = create(&mut conn, other, img("same.png", 1, false)).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Duplicate { code: ErrorCode::ImageUrlExists, .. }
        ));
    }

    #[tokio::test]
    async fn test_create_validations() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        assert!(matches!(
            create(&mut conn, 999, img("x.png", 1, false)).await.unwrap_err(),
            RepoError::NotFound { code: ErrorCode::ProductNotFound, .. }
        ));
        assert!(create(&mut conn, pid, img("  ", 1, false)).await.is_err());
        assert!(create(&mut conn, pid, img("zero.png", 0, false)).await.is_err());
        let inactive_principal = ProductImageCreate {
            is_active: false,
            ..img("off.png", 1, true)
        };
        assert!(create(&mut conn, pid, inactive_principal).await.is_err());
        assert!(list_by_product(&mut conn, pid, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_principal_promotes_lowest_order() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let a = create(&mut conn, pid, img("a.png", 1, true)).await.unwrap();
        let c = create(&mut conn, pid, img("c.png", 3, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();

        assert!(delete(&mut conn, a.id).await.unwrap());
        let images = list_by_product(&mut conn, pid, false).await.unwrap();
        assert_eq!(principals(&images), vec![b.id]);
        assert_eq!(images.len(), 2);
        assert!(images.iter().any(|i| i.id == c.id && !i.is_principal));

        assert!(!delete(&mut conn, a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_promotion_ties_break_on_id() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let a = create(&mut conn, pid, img("a.png", 1, true)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();
        create(&mut conn, pid, img("c.png", 2, false)).await.unwrap();

        delete(&mut conn, a.id).await.unwrap();
        let images = list_by_product(&mut conn, pid, false).await.unwrap();
        assert_eq!(principals(&images), vec![b.id]);
    }

    #[tokio::test]
    async fn test_delete_last_image_leaves_empty_group() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let only = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        assert!(delete(&mut conn, only.id).await.unwrap());
        assert!(list_by_product(&mut conn, pid, false).await.unwrap().is_empty());
        assert!(get_principal(&mut conn, pid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_principal_reactivates_and_checks_owner() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;
        let cat = insert_category(&mut conn, "Other").await;
        let other = insert_product(&mut conn, cat, "Other product").await;

        let a = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();
        assert!(toggle_active(&mut conn, b.id).await.unwrap());

        assert!(set_principal(&mut conn, pid, b.id).await.unwrap());
        let b = get_by_id(&mut conn, b.id).await.unwrap();
        assert!(b.is_active && b.is_principal);
        assert!(!get_by_id(&mut conn, a.id).await.unwrap().is_principal);

        assert!(!set_principal(&mut conn, pid, 999).await.unwrap());
        assert!(matches!(
            set_principal(&mut conn, other, a.id).await.unwrap_err(),
            RepoError::Validation { code: ErrorCode::ImageNotInProduct, .. }
        ));
    }

    #[tokio::test]
    async fn test_toggle_active_clears_principal_without_promotion() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let a = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();

        assert!(toggle_active(&mut conn, a.id).await.unwrap());
        let images = list_by_product(&mut conn, pid, false).await.unwrap();
        assert!(principals(&images).is_empty());

        // Read-time fallback
        let shown = get_principal(&mut conn, pid).await.unwrap().unwrap();
        assert_eq!(shown.id, b.id);
        assert!(!toggle_active(&mut conn, 999).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_principal_and_url() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let a = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();

        let updated = update(
            &mut conn,
            b.id,
            ProductImageUpdate {
                is_principal: Some(true),
                alt_text: Some("Back view".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated.is_principal);
        assert_eq!(updated.alt_text.as_deref(), Some("Back view"));
        assert!(!get_by_id(&mut conn, a.id).await.unwrap().is_principal);

        let err = update(
            &mut conn,
            a.id,
            ProductImageUpdate {
                url: Some("b.png".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { .. }));

        assert!(matches!(
            update(&mut conn, 999, ProductImageUpdate::default()).await.unwrap_err(),
            RepoError::NotFound { code: ErrorCode::ImageNotFound, .. }
        ));
    }

    #[tokio::test]
    async fn test_update_cannot_unflag_active_principal() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let a = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();
        assert!(get_by_id(&mut conn, a.id).await.unwrap().is_principal);

        let err = update(
            &mut conn,
            a.id,
            ProductImageUpdate {
                is_principal: Some(false),
                alt_text: Some("Front".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation { .. }));
        let unchanged = get_by_id(&mut conn, a.id).await.unwrap();
        assert!(unchanged.is_principal);
        assert_eq!(unchanged.alt_text, None);

        // A non-principal stays as it is
        let same = update(
            &mut conn,
            b.id,
            ProductImageUpdate {
                is_principal: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!same.is_principal);

        // Unflagging together with deactivation hands the flag over
        let hidden = update(
            &mut conn,
            a.id,
            ProductImageUpdate {
                is_principal: Some(false),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!hidden.is_principal);
        assert!(get_by_id(&mut conn, b.id).await.unwrap().is_principal);
    }

    #[tokio::test]
    async fn test_update_deactivating_principal_repairs_group() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let a = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();

        let updated = update(
            &mut conn,
            a.id,
            ProductImageUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!updated.is_principal);
        assert!(get_by_id(&mut conn, b.id).await.unwrap().is_principal);
    }

    #[tokio::test]
    async fn test_create_multiple_rejects_two_principals() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let err = create_multiple(
            &mut conn,
            pid,
            vec![img("x", 1, true), img("y", 2, true)],
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation { code: ErrorCode::ImageMultiplePrincipal, .. }
        ));
        assert!(list_by_product(&mut conn, pid, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_multiple_rolls_back_on_failure() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;
        create(&mut conn, pid, img("taken.png", 1, false)).await.unwrap();

        let err = create_multiple(
            &mut conn,
            pid,
            vec![img("fresh.png", 2, false), img("taken.png", 3, false)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { .. }));
        assert_eq!(list_by_product(&mut conn, pid, false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_multiple_assigns_principal() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let images = create_multiple(
            &mut conn,
            pid,
            vec![img("b.png", 2, false), img("a.png", 1, false)],
        )
        .await
        .unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, "a.png");
        assert!(images[0].is_principal);
        assert!(!images[1].is_principal);
    }

    #[tokio::test]
    async fn test_update_multiple_create_update_and_remove() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;

        let a = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();

        let item = |id: Option<i64>, url: &str, sort_order: i32, delete: bool| ProductImageBatchItem {
            id,
            variant_id: None,
            url: url.to_string(),
            alt_text: None,
            is_principal: false,
            sort_order,
            is_active: true,
            delete,
        };

        let images = update_multiple(
            &mut conn,
            pid,
            vec![
                item(Some(a.id), "a.png", 1, true),
                item(Some(b.id), "b2.png", 5, false),
                item(None, "c.png", 3, false),
            ],
        )
        .await
        .unwrap();

        assert_eq!(images.len(), 3);
        let a = images.iter().find(|i| i.id == a.id).unwrap();
        assert!(!a.is_active && !a.is_principal);
        let b = images.iter().find(|i| i.id == b.id).unwrap();
        assert_eq!(b.url, "b2.png");
        assert_eq!(b.sort_order, 5);
        // c has the lowest order among active images
        let c = images.iter().find(|i| i.url == "c.png").unwrap();
        assert_eq!(principals(&images), vec![c.id]);
    }

    #[tokio::test]
    async fn test_update_multiple_rejects_foreign_image() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;
        let cat = insert_category(&mut conn, "Other").await;
        let other = insert_product(&mut conn, cat, "Other product").await;
        let foreign = create(&mut conn, other, img("f.png", 1, false)).await.unwrap();

        let err = update_multiple(
            &mut conn,
            pid,
            vec![ProductImageBatchItem {
                id: Some(foreign.id),
                variant_id: None,
                url: "f.png".into(),
                alt_text: None,
                is_principal: false,
                sort_order: 1,
                is_active: true,
                delete: true,
            }],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation { code: ErrorCode::ImageNotInProduct, .. }));
        assert!(get_by_id(&mut conn, foreign.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_order_skips_foreign_ids() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let pid = setup(&mut conn).await;
        let cat = insert_category(&mut conn, "Other").await;
        let other = insert_product(&mut conn, cat, "Other product").await;

        let a = create(&mut conn, pid, img("a.png", 1, false)).await.unwrap();
        let b = create(&mut conn, pid, img("b.png", 2, false)).await.unwrap();
        let foreign = create(&mut conn, other, img("f.png", 1, false)).await.unwrap();

        let pairs = [
            ImageOrder { id: a.id, sort_order: 2 },
            ImageOrder { id: b.id, sort_order: 1 },
            ImageOrder { id: foreign.id, sort_order: 9 },
            ImageOrder { id: 999, sort_order: 4 },
        ];
        assert_eq!(update_order(&mut conn, pid, &pairs).await.unwrap(), 2);

        let images = list_by_product(&mut conn, pid, false).await.unwrap();
        assert_eq!(images[0].id, b.id);
        assert_eq!(get_by_id(&mut conn, foreign.id).await.unwrap().sort_order, 1);
    }
}
