//! Product Image Repository
//!
//! A group is the set of rows sharing `(product_id, variant_id)`; the
//! `variant_id IS ?` comparisons treat `NULL` as a group of its own.

use super::RepoResult;
use shared::models::{ProductImage, ProductImageCreate};
use sqlx::SqliteConnection;

const SELECT: &str = "SELECT id, product_id, variant_id, url, alt_text, sort_order, is_principal, is_active, created_at FROM product_image";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<ProductImage>> {
    let row = sqlx::query_as::<_, ProductImage>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_url(conn: &mut SqliteConnection, url: &str) -> RepoResult<Option<ProductImage>> {
    let row = sqlx::query_as::<_, ProductImage>(&format!("{SELECT} WHERE url = ?"))
        .bind(url)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Images of a product, ordered by `(sort_order, id)`
pub async fn list_by_product(
    conn: &mut SqliteConnection,
    product_id: i64,
    active_only: bool,
) -> RepoResult<Vec<ProductImage>> {
    let sql = if active_only {
        format!("{SELECT} WHERE product_id = ? AND is_active = 1 ORDER BY sort_order, id")
    } else {
        format!("{SELECT} WHERE product_id = ? ORDER BY sort_order, id")
    };
    let rows = sqlx::query_as::<_, ProductImage>(&sql)
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn list_group(
    conn: &mut SqliteConnection,
    product_id: i64,
    variant_id: Option<i64>,
) -> RepoResult<Vec<ProductImage>> {
    let rows = sqlx::query_as::<_, ProductImage>(&format!(
        "{SELECT} WHERE product_id = ? AND variant_id IS ? ORDER BY sort_order, id"
    ))
    .bind(product_id)
    .bind(variant_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// First active image of a group by `(sort_order, id)`
pub async fn first_active_in_group(
    conn: &mut SqliteConnection,
    product_id: i64,
    variant_id: Option<i64>,
) -> RepoResult<Option<ProductImage>> {
    let row = sqlx::query_as::<_, ProductImage>(&format!(
        "{SELECT} WHERE product_id = ? AND variant_id IS ? AND is_active = 1 ORDER BY sort_order, id LIMIT 1"
    ))
    .bind(product_id)
    .bind(variant_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Best principal for the product: flagged principal first, then the
/// product-level group, then the lowest order. Active rows only.
pub async fn find_principal(
    conn: &mut SqliteConnection,
    product_id: i64,
) -> RepoResult<Option<ProductImage>> {
    let row = sqlx::query_as::<_, ProductImage>(&format!(
        "{SELECT} WHERE product_id = ? AND is_active = 1 ORDER BY is_principal DESC, variant_id IS NULL DESC, sort_order, id LIMIT 1"
    ))
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn count_by_product(conn: &mut SqliteConnection, product_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_image WHERE product_id = ?")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    product_id: i64,
    data: &ProductImageCreate,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO product_image (product_id, variant_id, url, alt_text, sort_order, is_principal, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
    )
    .bind(product_id)
    .bind(data.variant_id)
    .bind(data.url.trim())
    .bind(&data.alt_text)
    .bind(data.sort_order)
    .bind(data.is_principal)
    .bind(data.is_active)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Write back every mutable column of `image`
pub async fn update(conn: &mut SqliteConnection, image: &ProductImage) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE product_image SET url = ?1, alt_text = ?2, sort_order = ?3, is_principal = ?4, is_active = ?5 WHERE id = ?6",
    )
    .bind(&image.url)
    .bind(&image.alt_text)
    .bind(image.sort_order)
    .bind(image.is_principal)
    .bind(image.is_active)
    .bind(image.id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Clear the principal flag across a group
pub async fn clear_principal_in_group(
    conn: &mut SqliteConnection,
    product_id: i64,
    variant_id: Option<i64>,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE product_image SET is_principal = 0 WHERE product_id = ? AND variant_id IS ? AND is_principal = 1",
    )
    .bind(product_id)
    .bind(variant_id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected())
}

/// Mark an image as the active principal of its group
pub async fn set_principal(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE product_image SET is_principal = 1, is_active = 1 WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Set the active flag; deactivation also drops the principal flag
pub async fn set_active(conn: &mut SqliteConnection, id: i64, is_active: bool) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE product_image SET is_active = ?1, is_principal = CASE WHEN ?1 THEN is_principal ELSE 0 END WHERE id = ?2",
    )
    .bind(is_active)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_order(conn: &mut SqliteConnection, id: i64, sort_order: i32) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE product_image SET sort_order = ? WHERE id = ?")
        .bind(sort_order)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM product_image WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
