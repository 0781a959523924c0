//! Restaurant Management Backend
//!
//! REST backend for a restaurant's customers, menu and orders. An order
//! together with its lines is treated as one aggregate: every multi-row
//! mutation runs in a single database transaction.
//!
//! # Module structure
//!
//! ```text
//! restaurant-server/src/
//! ├── core/         # configuration, state, HTTP server
//! ├── api/          # HTTP routes and handlers
//! ├── db/           # SQLite pool, migrations, repositories
//! ├── projections/  # read-only derived views
//! └── utils/        # errors, logging, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod projections;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};
