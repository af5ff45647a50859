pub mod aggregation;
pub mod docs;
pub mod health;
pub mod metrics;
pub mod resource;
pub mod stream;
