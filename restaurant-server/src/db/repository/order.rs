//! Order Repository
//!
//! The order aggregate write path. An order header and its lines are one
//! consistency boundary, so create, reconcile and delete each run inside a
//! single transaction: a missing reference part-way through rolls the
//! whole aggregate back.

use std::collections::HashMap;

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderCreate, OrderReconcile};
use sqlx::{Sqlite, SqlitePool, Transaction};

const ORDER_SELECT: &str =
    "SELECT id, order_date, customer_id, created_at, updated_at FROM orders";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} ORDER BY id");
    let rows = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// A customer's orders, newest first (ties broken by highest id).
pub async fn find_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE customer_id = ? ORDER BY order_date DESC, id DESC");
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

async fn require_customer(tx: &mut Transaction<'_, Sqlite>, id: i64) -> RepoResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM customer WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    if found.is_none() {
        return Err(RepoError::ReferenceNotFound(format!(
            "Customer {id} not found"
        )));
    }
    Ok(())
}

/// Current menu price for a line's unit-price snapshot.
async fn menu_price(tx: &mut Transaction<'_, Sqlite>, id: i64) -> RepoResult<f64> {
    let price: Option<f64> = sqlx::query_scalar("SELECT price FROM menu_item WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    price.ok_or_else(|| RepoError::ReferenceNotFound(format!("Menu item {id} not found")))
}

/// Create an order together with its lines, returning the new order id.
///
/// The header is inserted first to obtain the generated id, then each line
/// snapshots the current menu price. All-or-nothing.
pub async fn create(pool: &SqlitePool, data: OrderCreate) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if let Some(customer_id) = data.customer_id {
        require_customer(&mut tx, customer_id).await?;
    }

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (order_date, customer_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING id",
    )
    .bind(&data.order_date)
    .bind(data.customer_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    // Accumulated only for the log line; the reported order total is
    // always re-derived from the persisted lines.
    let mut running_total = 0.0;
    for item in &data.items {
        let unit_price = menu_price(&mut tx, item.menu_item_id).await?;
        let total_price = f64::from(item.quantity) * unit_price;
        running_total += total_price;

        sqlx::query(
            "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(unit_price)
        .bind(total_price)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(
        order_id,
        lines = data.items.len(),
        total = running_total,
        "Order created"
    );
    Ok(order_id)
}

/// Reconcile an order against a desired line set.
///
/// Three-way set reconciliation: matched ids are overwritten, id-less
/// entries are inserted with a fresh price snapshot, and persisted lines
/// absent from the desired set are deleted. An empty desired set removes
/// every line.
pub async fn reconcile(pool: &SqlitePool, id: i64, data: OrderReconcile) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if let Some(customer_id) = data.customer_id {
        require_customer(&mut tx, customer_id).await?;
    }

    let rows = sqlx::query(
        "UPDATE orders SET order_date = ?1, customer_id = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(&data.order_date)
    .bind(data.customer_id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }

    #[derive(sqlx::FromRow)]
    struct ExistingLine {
        id: i64,
        unit_price: f64,
    }
    let existing: Vec<ExistingLine> =
        sqlx::query_as("SELECT id, unit_price FROM order_item WHERE order_id = ?")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
    let existing: HashMap<i64, f64> = existing.into_iter().map(|l| (l.id, l.unit_price)).collect();

    let mut keep_ids: Vec<i64> = Vec::with_capacity(data.items.len());
    for item in &data.items {
        match item.id {
            Some(line_id) if existing.contains_key(&line_id) => {
                let unit_price = item.unit_price.unwrap_or(existing[&line_id]);
                let total_price = f64::from(item.quantity) * unit_price;
                sqlx::query(
                    "UPDATE order_item SET quantity = ?1, unit_price = ?2, total_price = ?3, updated_at = ?4 WHERE id = ?5",
                )
                .bind(item.quantity)
                .bind(unit_price)
                .bind(total_price)
                .bind(now)
                .bind(line_id)
                .execute(&mut *tx)
                .await?;
                keep_ids.push(line_id);
            }
            // Unmatched ids are treated like id-less entries: a new line
            _ => {
                let menu_item_id = item.menu_item_id.ok_or_else(|| {
                    RepoError::Validation("New order line is missing menu_item_id".into())
                })?;
                let unit_price = menu_price(&mut tx, menu_item_id).await?;
                let total_price = f64::from(item.quantity) * unit_price;
                let new_id: i64 = sqlx::query_scalar(
                    "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
                )
                .bind(id)
                .bind(menu_item_id)
                .bind(item.quantity)
                .bind(unit_price)
                .bind(total_price)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;
                keep_ids.push(new_id);
            }
        }
    }

    // Omission means removal: drop every persisted line absent from the
    // desired set.
    if keep_ids.is_empty() {
        sqlx::query("DELETE FROM order_item WHERE order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    } else {
        let placeholders = vec!["?"; keep_ids.len()].join(", ");
        let sql =
            format!("DELETE FROM order_item WHERE order_id = ? AND id NOT IN ({placeholders})");
        let mut query = sqlx::query(&sql).bind(id);
        for keep_id in &keep_ids {
            query = query.bind(*keep_id);
        }
        query.execute(&mut *tx).await?;
    }

    tx.commit().await?;
    tracing::info!(order_id = id, lines = keep_ids.len(), "Order reconciled");
    Ok(())
}

/// Delete an order and its lines atomically.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if found.is_none() {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }

    sqlx::query("DELETE FROM order_item WHERE order_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Link an order to a customer. Both must exist.
pub async fn link_customer(pool: &SqlitePool, order_id: i64, customer_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;
    if found.is_none() {
        return Err(RepoError::NotFound(format!("Order {order_id} not found")));
    }
    require_customer(&mut tx, customer_id).await?;

    sqlx::query("UPDATE orders SET customer_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(customer_id)
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Unlink a customer from an order, leaving it a guest order.
///
/// The supplied customer id must be the currently linked one.
pub async fn unlink_customer(pool: &SqlitePool, order_id: i64, customer_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let linked: Option<Option<i64>> =
        sqlx::query_scalar("SELECT customer_id FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(linked) = linked else {
        return Err(RepoError::NotFound(format!("Order {order_id} not found")));
    };
    if linked != Some(customer_id) {
        return Err(RepoError::Validation(
            "Customer id does not match the currently linked customer".into(),
        ));
    }

    sqlx::query("UPDATE orders SET customer_id = NULL, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
