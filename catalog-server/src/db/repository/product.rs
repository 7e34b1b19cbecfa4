//! Product Repository

use super::RepoResult;
use shared::models::{Product, ProductCreate};
use sqlx::SqliteConnection;

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, Product>(
        "SELECT id, name, description, category_id, brand_id, is_active, created_at FROM product WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn find_by_category(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(
        "SELECT id, name, description, category_id, brand_id, is_active, created_at FROM product WHERE category_id = ? AND is_active = 1 ORDER BY name, id",
    )
    .bind(category_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

pub async fn insert(conn: &mut SqliteConnection, data: &ProductCreate) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO product (name, description, category_id, brand_id, is_active, created_at) VALUES (?1, ?2, ?3, ?4, 1, ?5) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.category_id)
    .bind(data.brand_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn set_active(conn: &mut SqliteConnection, id: i64, is_active: bool) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE product SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
