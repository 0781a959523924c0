//! Read Projections
//!
//! Stateless derived views: each projection loads rows through the
//! persistence gateway and aggregates in memory (sum, max-by-date,
//! null-coalescing). Nothing here mutates state, and order totals are
//! always re-derived from the persisted lines.

use std::collections::HashMap;

use shared::models::{
    CustomerOrderItem, CustomerSummary, Order, OrderDetail, OrderItemDetail, OrderSummary,
    OrderTotal,
};
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, customer, order};

/// Display name for orders without a linked customer
pub const UNKNOWN_CUSTOMER: &str = "Unknown";

/// Display name for lines whose menu item reference dangles
pub const UNKNOWN_MENU_ITEM: &str = "Unknown Item";

const ORDER_ROW_SELECT: &str = "SELECT o.id, o.order_date, o.customer_id, c.name AS customer_name FROM orders o LEFT JOIN customer c ON o.customer_id = c.id";

const LINE_ROW_SELECT: &str = "SELECT oi.id, oi.order_id, oi.menu_item_id, m.name AS menu_item_name, oi.quantity, oi.unit_price, oi.total_price FROM order_item oi LEFT JOIN menu_item m ON oi.menu_item_id = m.id";

/// Order header with the customer name resolved
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_date: String,
    customer_id: Option<i64>,
    customer_name: Option<String>,
}

/// Order line with the menu item name resolved
#[derive(sqlx::FromRow)]
struct LineRow {
    id: i64,
    order_id: i64,
    menu_item_id: i64,
    menu_item_name: Option<String>,
    quantity: i32,
    unit_price: f64,
    total_price: f64,
}

fn line_detail(row: LineRow) -> OrderItemDetail {
    OrderItemDetail {
        id: row.id,
        order_id: row.order_id,
        menu_item_id: row.menu_item_id,
        menu_item_name: row
            .menu_item_name
            .unwrap_or_else(|| UNKNOWN_MENU_ITEM.to_string()),
        quantity: row.quantity,
        unit_price: row.unit_price,
        total_price: row.total_price,
    }
}

// ── Pure fold helpers ───────────────────────────────────────────────

/// Sum of line totals.
pub fn order_total(items: &[OrderItemDetail]) -> f64 {
    items.iter().map(|i| i.total_price).sum()
}

/// Most recent order: max order_date (ISO strings sort chronologically),
/// ties broken by highest id.
pub fn latest_order<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Option<&'a Order> {
    orders
        .into_iter()
        .max_by(|a, b| (a.order_date.as_str(), a.id).cmp(&(b.order_date.as_str(), b.id)))
}

fn totals_by_order(lines: &[LineRow]) -> HashMap<i64, f64> {
    let mut totals: HashMap<i64, f64> = HashMap::new();
    for line in lines {
        *totals.entry(line.order_id).or_insert(0.0) += line.total_price;
    }
    totals
}

// ── Customer projections ────────────────────────────────────────────

/// All customers, each with its most recent order's date and total.
pub async fn customer_summaries(pool: &SqlitePool) -> RepoResult<Vec<CustomerSummary>> {
    let customers = customer::find_all(pool).await?;
    let orders = order::find_all(pool).await?;
    let lines: Vec<LineRow> = sqlx::query_as(LINE_ROW_SELECT).fetch_all(pool).await?;
    let totals = totals_by_order(&lines);

    let summaries = customers
        .into_iter()
        .map(|c| {
            let last = latest_order(orders.iter().filter(|o| o.customer_id == Some(c.id)));
            CustomerSummary {
                id: c.id,
                name: c.name,
                email: c.email,
                phone: c.phone,
                last_order_date: last.map(|o| o.order_date.clone()),
                last_order_total: last
                    .map(|o| totals.get(&o.id).copied().unwrap_or(0.0))
                    .unwrap_or(0.0),
            }
        })
        .collect();
    Ok(summaries)
}

/// One customer with last-order info; `None` when the customer is absent.
pub async fn customer_summary(pool: &SqlitePool, id: i64) -> RepoResult<Option<CustomerSummary>> {
    let Some(c) = customer::find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let orders = order::find_by_customer(pool, id).await?;

    let sql =
        format!("{LINE_ROW_SELECT} JOIN orders o ON oi.order_id = o.id WHERE o.customer_id = ?");
    let lines: Vec<LineRow> = sqlx::query_as(&sql).bind(id).fetch_all(pool).await?;
    let totals = totals_by_order(&lines);

    let last = latest_order(orders.iter());
    Ok(Some(CustomerSummary {
        id: c.id,
        name: c.name,
        email: c.email,
        phone: c.phone,
        last_order_date: last.map(|o| o.order_date.clone()),
        last_order_total: last
            .map(|o| totals.get(&o.id).copied().unwrap_or(0.0))
            .unwrap_or(0.0),
    }))
}

/// What a customer ordered across all their orders, with menu names.
pub async fn customer_order_items(
    pool: &SqlitePool,
    customer_id: i64,
) -> RepoResult<Vec<CustomerOrderItem>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        customer_name: String,
        menu_item_name: Option<String>,
        quantity: i32,
        total_price: f64,
    }

    let rows: Vec<Row> = sqlx::query_as(
        "SELECT c.name AS customer_name, m.name AS menu_item_name, oi.quantity, oi.total_price FROM order_item oi JOIN orders o ON oi.order_id = o.id JOIN customer c ON o.customer_id = c.id LEFT JOIN menu_item m ON oi.menu_item_id = m.id WHERE o.customer_id = ? ORDER BY oi.id",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| CustomerOrderItem {
            customer_name: r.customer_name,
            menu_item_name: r
                .menu_item_name
                .unwrap_or_else(|| UNKNOWN_MENU_ITEM.to_string()),
            quantity: r.quantity,
            total_price: r.total_price,
        })
        .collect())
}

// ── Order projections ───────────────────────────────────────────────

/// All orders with resolved customer names and derived totals.
pub async fn order_summaries(pool: &SqlitePool) -> RepoResult<Vec<OrderSummary>> {
    let sql = format!("{ORDER_ROW_SELECT} ORDER BY o.id");
    let orders: Vec<OrderRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    let lines: Vec<LineRow> = sqlx::query_as(LINE_ROW_SELECT).fetch_all(pool).await?;
    let totals = totals_by_order(&lines);

    Ok(orders
        .into_iter()
        .map(|o| OrderSummary {
            id: o.id,
            order_date: o.order_date,
            customer_id: o.customer_id,
            customer_name: o
                .customer_name
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            total: totals.get(&o.id).copied().unwrap_or(0.0),
        })
        .collect())
}

/// One order with its lines; `None` when the order is absent.
pub async fn order_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let sql = format!("{ORDER_ROW_SELECT} WHERE o.id = ?");
    let row: Option<OrderRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let sql = format!("{LINE_ROW_SELECT} WHERE oi.order_id = ? ORDER BY oi.id");
    let lines: Vec<LineRow> = sqlx::query_as(&sql).bind(id).fetch_all(pool).await?;
    let items: Vec<OrderItemDetail> = lines.into_iter().map(line_detail).collect();
    let total = order_total(&items);

    Ok(Some(OrderDetail {
        id: row.id,
        order_date: row.order_date,
        customer_id: row.customer_id,
        customer_name: row
            .customer_name
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
        total,
        items,
    }))
}

/// A customer's orders with lines, newest first.
pub async fn orders_for_customer(
    pool: &SqlitePool,
    customer_id: i64,
) -> RepoResult<Vec<OrderDetail>> {
    let sql = format!("{ORDER_ROW_SELECT} WHERE o.customer_id = ? ORDER BY o.order_date DESC, o.id DESC");
    let orders: Vec<OrderRow> = sqlx::query_as(&sql).bind(customer_id).fetch_all(pool).await?;

    let sql = format!(
        "{LINE_ROW_SELECT} WHERE oi.order_id IN (SELECT id FROM orders WHERE customer_id = ?) ORDER BY oi.id"
    );
    let lines: Vec<LineRow> = sqlx::query_as(&sql).bind(customer_id).fetch_all(pool).await?;

    let mut by_order: HashMap<i64, Vec<OrderItemDetail>> = HashMap::new();
    for line in lines {
        by_order
            .entry(line.order_id)
            .or_default()
            .push(line_detail(line));
    }

    Ok(orders
        .into_iter()
        .map(|o| {
            let items = by_order.remove(&o.id).unwrap_or_default();
            let total = order_total(&items);
            OrderDetail {
                id: o.id,
                order_date: o.order_date,
                customer_id: o.customer_id,
                customer_name: o
                    .customer_name
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
                total,
                items,
            }
        })
        .collect())
}

/// Derived total for one order; `None` when the order is absent.
pub async fn order_total_for(pool: &SqlitePool, order_id: i64) -> RepoResult<Option<OrderTotal>> {
    if order::find_by_id(pool, order_id).await?.is_none() {
        return Ok(None);
    }
    let sql = format!("{LINE_ROW_SELECT} WHERE oi.order_id = ?");
    let lines: Vec<LineRow> = sqlx::query_as(&sql).bind(order_id).fetch_all(pool).await?;
    let items: Vec<OrderItemDetail> = lines.into_iter().map(line_detail).collect();
    Ok(Some(OrderTotal {
        order_id,
        total: order_total(&items),
    }))
}

// ── Order item projections ──────────────────────────────────────────

pub async fn order_item_details(pool: &SqlitePool) -> RepoResult<Vec<OrderItemDetail>> {
    let sql = format!("{LINE_ROW_SELECT} ORDER BY oi.id");
    let lines: Vec<LineRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(lines.into_iter().map(line_detail).collect())
}

pub async fn order_item_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderItemDetail>> {
    let sql = format!("{LINE_ROW_SELECT} WHERE oi.id = ?");
    let row: Option<LineRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.map(line_detail))
}

pub async fn order_items_by_order(
    pool: &SqlitePool,
    order_id: i64,
) -> RepoResult<Vec<OrderItemDetail>> {
    let sql = format!("{LINE_ROW_SELECT} WHERE oi.order_id = ? ORDER BY oi.id");
    let lines: Vec<LineRow> = sqlx::query_as(&sql).bind(order_id).fetch_all(pool).await?;
    Ok(lines.into_iter().map(line_detail).collect())
}

pub async fn order_items_by_menu_item(
    pool: &SqlitePool,
    menu_item_id: i64,
) -> RepoResult<Vec<OrderItemDetail>> {
    let sql = format!("{LINE_ROW_SELECT} WHERE oi.menu_item_id = ? ORDER BY oi.id");
    let lines: Vec<LineRow> = sqlx::query_as(&sql).bind(menu_item_id).fetch_all(pool).await?;
    Ok(lines.into_iter().map(line_detail).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    fn order_row(id: i64, date: &str, customer_id: Option<i64>) -> Order {
        Order {
            id,
            order_date: date.into(),
            customer_id,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn latest_order_prefers_max_date_then_highest_id() {
        let orders = vec![
            order_row(1, "2025-02-01", Some(1)),
            order_row(2, "2025-02-08", Some(1)),
            order_row(3, "2025-02-08", Some(1)),
        ];
        let last = latest_order(orders.iter()).unwrap();
        assert_eq!(last.id, 3);

        let none: Vec<Order> = Vec::new();
        assert!(latest_order(none.iter()).is_none());
    }

    #[test]
    fn order_total_sums_line_totals() {
        let items = vec![
            OrderItemDetail {
                id: 1,
                order_id: 1,
                menu_item_id: 1,
                menu_item_name: "Pizza".into(),
                quantity: 2,
                unit_price: 15.0,
                total_price: 30.0,
            },
            OrderItemDetail {
                id: 2,
                order_id: 1,
                menu_item_id: 2,
                menu_item_name: "Soup".into(),
                quantity: 1,
                unit_price: 4.5,
                total_price: 4.5,
            },
        ];
        assert_eq!(order_total(&items), 34.5);
        assert_eq!(order_total(&[]), 0.0);
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    async fn seed(pool: &SqlitePool, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
    }

    #[tokio::test]
    async fn customer_summary_reports_latest_order_and_its_total() {
        let pool = test_pool().await;
        let customer_id = seed(
            &pool,
            "INSERT INTO customer (name, phone, created_at, updated_at) VALUES ('Alice', '555-0100', 0, 0) RETURNING id",
        )
        .await;
        let menu_id = seed(
            &pool,
            "INSERT INTO menu_item (name, price, created_at, updated_at) VALUES ('Pizza', 15.0, 0, 0) RETURNING id",
        )
        .await;

        let old_order = seed(
            &pool,
            &format!(
                "INSERT INTO orders (order_date, customer_id, created_at, updated_at) VALUES ('2025-01-01', {customer_id}, 0, 0) RETURNING id"
            ),
        )
        .await;
        let new_order = seed(
            &pool,
            &format!(
                "INSERT INTO orders (order_date, customer_id, created_at, updated_at) VALUES ('2025-02-08', {customer_id}, 0, 0) RETURNING id"
            ),
        )
        .await;

        for (order_id, quantity) in [(old_order, 1), (new_order, 2)] {
            sqlx::query(
                "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at) VALUES (?1, ?2, ?3, 15.0, ?4, 0, 0)",
            )
            .bind(order_id)
            .bind(menu_id)
            .bind(quantity)
            .bind(f64::from(quantity) * 15.0)
            .execute(&pool)
            .await
            .unwrap();
        }

        let summary = customer_summary(&pool, customer_id).await.unwrap().unwrap();
        assert_eq!(summary.last_order_date.as_deref(), Some("2025-02-08"));
        assert_eq!(summary.last_order_total, 30.0);

        let all = customer_summaries(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].last_order_total, 30.0);
    }

    #[tokio::test]
    async fn customer_without_orders_has_zero_total_and_no_date() {
        let pool = test_pool().await;
        let customer_id = seed(
            &pool,
            "INSERT INTO customer (name, phone, created_at, updated_at) VALUES ('Alice', '555-0100', 0, 0) RETURNING id",
        )
        .await;

        let summary = customer_summary(&pool, customer_id).await.unwrap().unwrap();
        assert_eq!(summary.last_order_date, None);
        assert_eq!(summary.last_order_total, 0.0);
    }

    #[tokio::test]
    async fn guest_order_shows_unknown_customer() {
        let pool = test_pool().await;
        seed(
            &pool,
            "INSERT INTO orders (order_date, created_at, updated_at) VALUES ('2025-02-08', 0, 0) RETURNING id",
        )
        .await;

        let summaries = order_summaries(&pool).await.unwrap();
        assert_eq!(summaries[0].customer_name, UNKNOWN_CUSTOMER);
        assert_eq!(summaries[0].total, 0.0);
    }

    #[tokio::test]
    async fn dangling_menu_reference_shows_unknown_item() {
        let pool = test_pool().await;
        let order_id = seed(
            &pool,
            "INSERT INTO orders (order_date, created_at, updated_at) VALUES ('2025-02-08', 0, 0) RETURNING id",
        )
        .await;
        let menu_id = seed(
            &pool,
            "INSERT INTO menu_item (name, price, created_at, updated_at) VALUES ('Pizza', 15.0, 0, 0) RETURNING id",
        )
        .await;
        sqlx::query(
            "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at) VALUES (?1, ?2, 1, 15.0, 15.0, 0, 0)",
        )
        .bind(order_id)
        .bind(menu_id)
        .execute(&pool)
        .await
        .unwrap();

        // Foreign keys are off on this bare test pool, so the reference
        // can be made to dangle directly.
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM menu_item WHERE id = ?")
            .bind(menu_id)
            .execute(&pool)
            .await
            .unwrap();

        let details = order_items_by_order(&pool, order_id).await.unwrap();
        assert_eq!(details[0].menu_item_name, UNKNOWN_MENU_ITEM);

        // The projection total still matches the persisted line sum
        let detail = order_detail(&pool, order_id).await.unwrap().unwrap();
        assert_eq!(detail.total, 15.0);
    }

    #[tokio::test]
    async fn orders_for_customer_come_newest_first_with_lines() {
        let pool = test_pool().await;
        let customer_id = seed(
            &pool,
            "INSERT INTO customer (name, phone, created_at, updated_at) VALUES ('Alice', '555-0100', 0, 0) RETURNING id",
        )
        .await;
        let menu_id = seed(
            &pool,
            "INSERT INTO menu_item (name, price, created_at, updated_at) VALUES ('Soup', 4.5, 0, 0) RETURNING id",
        )
        .await;

        for date in ["2025-01-01", "2025-02-08"] {
            let order_id = seed(
                &pool,
                &format!(
                    "INSERT INTO orders (order_date, customer_id, created_at, updated_at) VALUES ('{date}', {customer_id}, 0, 0) RETURNING id"
                ),
            )
            .await;
            sqlx::query(
                "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, total_price, created_at, updated_at) VALUES (?1, ?2, 1, 4.5, 4.5, 0, 0)",
            )
            .bind(order_id)
            .bind(menu_id)
            .execute(&pool)
            .await
            .unwrap();
        }

        let details = orders_for_customer(&pool, customer_id).await.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].order_date, "2025-02-08");
        assert_eq!(details[0].items.len(), 1);
        assert_eq!(details[0].total, 4.5);

        let items = customer_order_items(&pool, customer_id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].customer_name, "Alice");
        assert_eq!(items[0].menu_item_name, "Soup");
    }

    #[tokio::test]
    async fn order_total_endpoint_distinguishes_missing_and_empty() {
        let pool = test_pool().await;
        assert!(order_total_for(&pool, 9).await.unwrap().is_none());

        let order_id = seed(
            &pool,
            "INSERT INTO orders (order_date, created_at, updated_at) VALUES ('2025-02-08', 0, 0) RETURNING id",
        )
        .await;
        let total = order_total_for(&pool, order_id).await.unwrap().unwrap();
        assert_eq!(total.total, 0.0);
    }
}
