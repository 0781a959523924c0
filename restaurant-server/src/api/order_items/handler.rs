//! Order Item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::order_item;
use crate::projections;
use crate::utils::validation::{validate_price, validate_quantity};
use crate::utils::{AppError, AppResult};
use shared::models::{
    CustomerOrderItem, OrderItem, OrderItemCreate, OrderItemDetail, OrderItemUpdate, OrderTotal,
};

/// GET /api/order-items - all lines with menu item names
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<OrderItemDetail>>> {
    let items = projections::order_item_details(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/order-items/{id} - one line with its menu item name
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderItemDetail>> {
    let item = projections::order_item_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order item {id}")))?;
    Ok(Json(item))
}

/// GET /api/order-items/by-order/{order_id} - lines of one order
pub async fn list_by_order(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<Vec<OrderItemDetail>>> {
    let items = projections::order_items_by_order(&state.pool, order_id).await?;
    Ok(Json(items))
}

/// GET /api/order-items/by-menu-item/{menu_item_id} - lines referencing a menu item
pub async fn list_by_menu_item(
    State(state): State<ServerState>,
    Path(menu_item_id): Path<i64>,
) -> AppResult<Json<Vec<OrderItemDetail>>> {
    let items = projections::order_items_by_menu_item(&state.pool, menu_item_id).await?;
    Ok(Json(items))
}

/// GET /api/order-items/by-customer/{customer_id} - what a customer ordered
pub async fn list_by_customer(
    State(state): State<ServerState>,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<Vec<CustomerOrderItem>>> {
    let items = projections::customer_order_items(&state.pool, customer_id).await?;
    Ok(Json(items))
}

/// GET /api/order-items/total/{order_id} - derived total for one order
pub async fn order_total(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<OrderTotal>> {
    let total = projections::order_total_for(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id}")))?;
    Ok(Json(total))
}

/// POST /api/order-items - create a line bound to an existing order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderItemCreate>,
) -> AppResult<Json<OrderItem>> {
    validate_quantity(payload.quantity, "quantity")?;

    let item = order_item::create(&state.pool, payload).await?;
    tracing::info!(order_item_id = item.id, order_id = item.order_id, "Order item created");
    Ok(Json(item))
}

/// PUT /api/order-items/{id} - update a line (total is recomputed)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderItemUpdate>,
) -> AppResult<Json<OrderItem>> {
    if let Some(body_id) = payload.id
        && body_id != id
    {
        return Err(AppError::validation(
            "Order item id mismatch between path and body",
        ));
    }
    if let Some(quantity) = payload.quantity {
        validate_quantity(quantity, "quantity")?;
    }
    if let Some(unit_price) = payload.unit_price {
        validate_price(unit_price, "unit_price")?;
    }

    let item = order_item::update(&state.pool, id, payload).await?;
    Ok(Json(item))
}

/// DELETE /api/order-items/{id} - delete a line
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    order_item::delete(&state.pool, id).await?;
    Ok(Json(true))
}
