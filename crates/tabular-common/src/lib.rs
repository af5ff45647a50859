//! Shared types for the tabular gateway: the resource/schema data
//! model and the configuration snapshot.

pub mod config;
pub mod model;

pub use config::GatewayConfig;
pub use model::{Column, ColumnType, Resource, Schema};
