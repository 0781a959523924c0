//! Order API Handlers
//!
//! Writes go through the order aggregate path in the repository; reads go
//! through the projections.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::projections;
use crate::utils::validation::{validate_date, validate_quantity};
use crate::utils::{AppError, AppResult};
use shared::models::{OrderCreate, OrderDetail, OrderReconcile, OrderSummary};

/// Response for order creation
#[derive(serde::Serialize)]
pub struct OrderCreated {
    pub id: i64,
}

/// GET /api/orders - all orders with customer names and derived totals
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<OrderSummary>>> {
    let orders = projections::order_summaries(&state.pool).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - one order with its lines
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = projections::order_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;
    Ok(Json(detail))
}

/// GET /api/orders/by-customer/{customer_id} - a customer's orders, newest first
pub async fn list_by_customer(
    State(state): State<ServerState>,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let orders = projections::orders_for_customer(&state.pool, customer_id).await?;
    Ok(Json(orders))
}

/// POST /api/orders - create an order with its lines
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderCreated>> {
    validate_date(&payload.order_date, "order_date")?;
    for item in &payload.items {
        validate_quantity(item.quantity, "quantity")?;
    }

    let id = order::create(&state.pool, payload).await?;
    Ok(Json(OrderCreated { id }))
}

/// PUT /api/orders/{id} - reconcile an order against a desired line set
///
/// Lines omitted from the payload are deleted.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderReconcile>,
) -> AppResult<Json<OrderDetail>> {
    validate_date(&payload.order_date, "order_date")?;
    for item in &payload.items {
        validate_quantity(item.quantity, "quantity")?;
    }

    order::reconcile(&state.pool, id, payload).await?;

    let detail = projections::order_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;
    Ok(Json(detail))
}

/// DELETE /api/orders/{id} - delete an order and its lines
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    order::delete(&state.pool, id).await?;
    tracing::info!(order_id = id, "Order deleted");
    Ok(Json(true))
}

/// PUT /api/orders/{id}/customer/{customer_id} - link a customer
pub async fn link_customer(
    State(state): State<ServerState>,
    Path((id, customer_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    order::link_customer(&state.pool, id, customer_id).await?;
    Ok(Json(true))
}

/// DELETE /api/orders/{id}/customer/{customer_id} - unlink the customer
pub async fn unlink_customer(
    State(state): State<ServerState>,
    Path((id, customer_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    order::unlink_customer(&state.pool, id, customer_id).await?;
    Ok(Json(true))
}
