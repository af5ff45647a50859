//! axum HTTP surface (§6.1, §10.1, §10.5): routing, middleware,
//! handlers, and the binary entry point, grounded on
//! `ouroboros-api`/`data-bridge-api`'s crate-per-concern split.

pub mod correlation;
pub mod error;
pub mod handlers;
pub mod links;
pub mod query;
pub mod router;
pub mod server;
pub mod state;
pub mod telemetry;

pub use error::ApiError;
pub use router::build_router;
pub use server::{run, ServerConfig};
pub use state::AppState;
