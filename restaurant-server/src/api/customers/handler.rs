//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::customer;
use crate::projections;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PHONE_LEN, validate_optional_email, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Customer, CustomerCreate, CustomerSummary, CustomerUpdate};

/// GET /api/customers - all customers with last-order summary
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<CustomerSummary>>> {
    let customers = projections::customer_summaries(&state.pool).await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id} - one customer with last-order summary
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerSummary>> {
    let summary = projections::customer_summary(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id}")))?;
    Ok(Json(summary))
}

/// POST /api/customers - create a customer
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_PHONE_LEN)?;
    validate_optional_email(&payload.email)?;

    let customer = customer::create(&state.pool, payload).await?;
    tracing::info!(customer_id = customer.id, "Customer created");
    Ok(Json(customer))
}

/// PUT /api/customers/{id} - update a customer
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    if let Some(body_id) = payload.id
        && body_id != id
    {
        return Err(AppError::validation(
            "Customer id mismatch between path and body",
        ));
    }
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(ref phone) = payload.phone {
        validate_required_text(phone, "phone", MAX_PHONE_LEN)?;
    }
    validate_optional_email(&payload.email)?;

    let customer = customer::update(&state.pool, id, payload).await?;
    Ok(Json(customer))
}

/// DELETE /api/customers/{id} - delete a customer and its orders
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    customer::delete(&state.pool, id).await?;
    tracing::info!(customer_id = id, "Customer deleted");
    Ok(Json(true))
}
