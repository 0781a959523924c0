//! Data models
//!
//! Shared between restaurant-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod customer;
pub mod menu_item;
pub mod order;

// Re-exports
pub use customer::*;
pub use menu_item::*;
pub use order::*;
