//! Shared types for the restaurant backend
//!
//! Data models and request/response DTOs used by the server crate and by
//! API clients. Row types derive `sqlx::FromRow` behind the `db` feature
//! so frontend consumers can depend on this crate without pulling sqlx.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
