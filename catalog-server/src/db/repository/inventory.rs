//! Inventory Repository

use super::RepoResult;
use sqlx::SqliteConnection;

pub async fn insert(conn: &mut SqliteConnection, product_id: i64, quantity: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO inventory (product_id, quantity, updated_at) VALUES (?, ?, ?)")
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Stock on hand; 0 when no inventory row exists
pub async fn quantity(conn: &mut SqliteConnection, product_id: i64) -> RepoResult<i64> {
    let quantity: Option<i64> =
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(quantity.unwrap_or(0))
}
