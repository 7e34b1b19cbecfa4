//! Category Repository
//!
//! Row-level access for the category forest. Structural rules (acyclicity,
//! slug derivation, soft/hard retirement) live in `catalog::hierarchy`.

use super::{RepoResult, unique_slug};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::SqliteConnection;
use std::collections::HashMap;

const TABLE: &str = "category";

const SELECT: &str = "SELECT id, parent_id, name, description, image_url, icon, slug, sort_order, is_active, created_at FROM category";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_slug(conn: &mut SqliteConnection, slug: &str) -> RepoResult<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!("{SELECT} WHERE slug = ?"))
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_all(conn: &mut SqliteConnection, active_only: bool) -> RepoResult<Vec<Category>> {
    let sql = if active_only {
        format!("{SELECT} WHERE is_active = 1 ORDER BY sort_order, name, id")
    } else {
        format!("{SELECT} ORDER BY sort_order, name, id")
    };
    let rows = sqlx::query_as::<_, Category>(&sql)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

/// Active category with the same name (case-insensitive), ignoring `exclude_id`
pub async fn find_active_by_name_ci(
    conn: &mut SqliteConnection,
    name: &str,
    exclude_id: Option<i64>,
) -> RepoResult<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "{SELECT} WHERE is_active = 1 AND name = ? COLLATE NOCASE AND id IS NOT ? LIMIT 1"
    ))
    .bind(name.trim())
    .bind(exclude_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// `base` or the first free `base-N`
pub async fn next_free_slug(
    conn: &mut SqliteConnection,
    base: &str,
    exclude_id: Option<i64>,
) -> RepoResult<String> {
    unique_slug(conn, TABLE, base, exclude_id).await
}

pub async fn insert(
    conn: &mut SqliteConnection,
    data: &CategoryCreate,
    slug: &str,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO category (parent_id, name, description, image_url, icon, slug, sort_order, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8) RETURNING id",
    )
    .bind(data.parent_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(&data.icon)
    .bind(slug)
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Overwrite every editable field; returns whether the row exists
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    data: &CategoryUpdate,
    slug: &str,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE category SET parent_id = ?1, name = ?2, description = ?3, image_url = ?4, icon = ?5, slug = ?6, sort_order = ?7, is_active = ?8 WHERE id = ?9",
    )
    .bind(data.parent_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(&data.icon)
    .bind(slug)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_parent(
    conn: &mut SqliteConnection,
    id: i64,
    parent_id: Option<i64>,
    sort_order: i32,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE category SET parent_id = ?, sort_order = ? WHERE id = ?")
        .bind(parent_id)
        .bind(sort_order)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_active(conn: &mut SqliteConnection, id: i64, is_active: bool) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE category SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_sort_order(
    conn: &mut SqliteConnection,
    id: i64,
    sort_order: i32,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE category SET sort_order = ? WHERE id = ?")
        .bind(sort_order)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Move every child of `from_id` under `to_parent`
pub async fn reparent_children(
    conn: &mut SqliteConnection,
    from_id: i64,
    to_parent: Option<i64>,
) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE category SET parent_id = ? WHERE parent_id = ?")
        .bind(to_parent)
        .bind(from_id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn hard_delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn child_ids(conn: &mut SqliteConnection, parent_id: i64) -> RepoResult<Vec<i64>> {
    let ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM category WHERE parent_id = ? ORDER BY sort_order, id")
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?;
    Ok(ids)
}

pub async fn count_active_children(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM category WHERE parent_id = ? AND is_active = 1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

pub async fn count_active_products(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE category_id = ? AND is_active = 1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

/// Products of any status still pointing at the category
pub async fn count_products(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE category_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Active product count per category, one grouped query
pub async fn active_product_counts(conn: &mut SqliteConnection) -> RepoResult<HashMap<i64, i64>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT category_id, COUNT(*) FROM product WHERE is_active = 1 GROUP BY category_id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().collect())
}
