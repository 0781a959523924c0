//! Order Model
//!
//! An order and its lines form one aggregate: the lines' lifetime is
//! bounded by the order, and the order total is always derived from the
//! persisted lines, never stored.

use serde::{Deserialize, Serialize};

/// Order header row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// ISO date (YYYY-MM-DD)
    pub order_date: String,
    /// Owning customer; NULL for guest orders
    pub customer_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    /// Snapshot of menu_item.price taken when the line was created
    pub unit_price: f64,
    /// Always quantity * unit_price
    pub total_price: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Requested line when creating an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    pub quantity: i32,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    /// ISO date (YYYY-MM-DD)
    pub order_date: String,
    /// Must resolve to an existing customer when present; None = guest order
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

/// One desired line when reconciling an order.
///
/// A present `id` targets an existing line on the order (quantity and unit
/// price are overwritten); an absent `id` creates a new line, which
/// requires `menu_item_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileItem {
    pub id: Option<i64>,
    pub menu_item_id: Option<i64>,
    pub quantity: i32,
    /// For matched lines; falls back to the stored snapshot when absent
    pub unit_price: Option<f64>,
}

/// Reconcile (update) order payload. Lines omitted from `items` are deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReconcile {
    /// ISO date (YYYY-MM-DD)
    pub order_date: String,
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<ReconcileItem>,
}

/// Create order item payload (standalone line endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
}

/// Update order item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemUpdate {
    /// Echo of the path id; must match when present
    pub id: Option<i64>,
    pub order_id: Option<i64>,
    pub menu_item_id: Option<i64>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
}

/// Order with resolved customer name and derived total (for list views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub order_date: String,
    pub customer_id: Option<i64>,
    /// "Unknown" when the order is not linked to a customer
    pub customer_name: String,
    /// Sum of the order's line totals
    pub total: f64,
}

/// Order line with resolved menu item name (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    /// "Unknown Item" when the menu item reference dangles
    pub menu_item_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Order summary plus its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub order_date: String,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub total: f64,
    pub items: Vec<OrderItemDetail>,
}

/// What a customer ordered, across all their orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerOrderItem {
    pub customer_name: String,
    pub menu_item_name: String,
    pub quantity: i32,
    pub total_price: f64,
}

/// Derived total for one order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTotal {
    pub order_id: i64,
    pub total: f64,
}
