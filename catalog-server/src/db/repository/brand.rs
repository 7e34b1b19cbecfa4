//! Brand Repository

use super::{RepoResult, unique_slug};
use shared::models::Brand;
use sqlx::SqliteConnection;

const TABLE: &str = "brand";

pub async fn find_all(conn: &mut SqliteConnection, active_only: bool) -> RepoResult<Vec<Brand>> {
    let sql = if active_only {
        "SELECT id, name, slug, is_active, created_at FROM brand WHERE is_active = 1 ORDER BY name, id"
    } else {
        "SELECT id, name, slug, is_active, created_at FROM brand ORDER BY name, id"
    };
    let rows = sqlx::query_as::<_, Brand>(sql).fetch_all(&mut *conn).await?;
    Ok(rows)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Brand>> {
    let row = sqlx::query_as::<_, Brand>(
        "SELECT id, name, slug, is_active, created_at FROM brand WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn find_active_by_name_ci(
    conn: &mut SqliteConnection,
    name: &str,
) -> RepoResult<Option<Brand>> {
    let row = sqlx::query_as::<_, Brand>(
        "SELECT id, name, slug, is_active, created_at FROM brand WHERE is_active = 1 AND name = ? COLLATE NOCASE LIMIT 1",
    )
    .bind(name.trim())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn next_free_slug(conn: &mut SqliteConnection, base: &str) -> RepoResult<String> {
    unique_slug(conn, TABLE, base, None).await
}

pub async fn insert(conn: &mut SqliteConnection, name: &str, slug: &str) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO brand (name, slug, is_active, created_at) VALUES (?1, ?2, 1, ?3) RETURNING id",
    )
    .bind(name.trim())
    .bind(slug)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn set_active(conn: &mut SqliteConnection, id: i64, is_active: bool) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE brand SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn hard_delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM brand WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Products of any status referencing the brand
pub async fn count_products(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE brand_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
