//! Order Item Repository
//!
//! Standalone line CRUD. Every write keeps `total_price == quantity *
//! unit_price`; creates snapshot the current menu price.

use super::{RepoError, RepoResult};
use shared::models::{OrderItem, OrderItemCreate, OrderItemUpdate};
use sqlx::{Sqlite, SqlitePool, Transaction};

const ORDER_ITEM_SELECT: &str = "SELECT id, order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at FROM order_item";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ORDER_ITEM_SELECT} ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderItem>> {
    let sql = format!("{ORDER_ITEM_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ORDER_ITEM_SELECT} WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_menu_item(pool: &SqlitePool, menu_item_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ORDER_ITEM_SELECT} WHERE menu_item_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(menu_item_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

async fn require_order(tx: &mut Transaction<'_, Sqlite>, id: i64) -> RepoResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    if found.is_none() {
        return Err(RepoError::ReferenceNotFound(format!("Order {id} not found")));
    }
    Ok(())
}

async fn menu_price(tx: &mut Transaction<'_, Sqlite>, id: i64) -> RepoResult<f64> {
    let price: Option<f64> = sqlx::query_scalar("SELECT price FROM menu_item WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    price.ok_or_else(|| RepoError::ReferenceNotFound(format!("Menu item {id} not found")))
}

/// Create a line bound to an existing order, snapshotting the menu price.
pub async fn create(pool: &SqlitePool, data: OrderItemCreate) -> RepoResult<OrderItem> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    require_order(&mut tx, data.order_id).await?;
    let unit_price = menu_price(&mut tx, data.menu_item_id).await?;
    let total_price = f64::from(data.quantity) * unit_price;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
    )
    .bind(data.order_id)
    .bind(data.menu_item_id)
    .bind(data.quantity)
    .bind(unit_price)
    .bind(total_price)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order item".into()))
}

/// Update a line. References may be moved; the total is always recomputed
/// from the final quantity and unit price.
pub async fn update(pool: &SqlitePool, id: i64, data: OrderItemUpdate) -> RepoResult<OrderItem> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let sql = format!("{ORDER_ITEM_SELECT} WHERE id = ?");
    let existing: Option<OrderItem> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(existing) = existing else {
        return Err(RepoError::NotFound(format!("Order item {id} not found")));
    };

    let order_id = data.order_id.unwrap_or(existing.order_id);
    let menu_item_id = data.menu_item_id.unwrap_or(existing.menu_item_id);
    if order_id != existing.order_id {
        require_order(&mut tx, order_id).await?;
    }
    if menu_item_id != existing.menu_item_id {
        // Moving to another menu item must point at a real row; the unit
        // price still comes from the payload or the stored snapshot.
        menu_price(&mut tx, menu_item_id).await?;
    }

    let quantity = data.quantity.unwrap_or(existing.quantity);
    if quantity <= 0 {
        return Err(RepoError::Validation(format!(
            "Quantity must be positive: {quantity}"
        )));
    }
    let unit_price = data.unit_price.unwrap_or(existing.unit_price);
    let total_price = f64::from(quantity) * unit_price;

    sqlx::query(
        "UPDATE order_item SET order_id = ?1, menu_item_id = ?2, quantity = ?3, unit_price = ?4, total_price = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(order_id)
    .bind(menu_item_id)
    .bind(quantity)
    .bind(unit_price)
    .bind(total_price)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order item {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM order_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order item {id} not found")));
    }
    Ok(())
}
