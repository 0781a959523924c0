//! Order Item API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/order-items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/by-order/{order_id}", get(handler::list_by_order))
        .route(
            "/by-menu-item/{menu_item_id}",
            get(handler::list_by_menu_item),
        )
        .route("/by-customer/{customer_id}", get(handler::list_by_customer))
        .route("/total/{order_id}", get(handler::order_total))
}
