//! Everything that holds the pooled `reqwest::Client` and talks to
//! PostgREST: the Resource Resolver, the Executor, and the Streaming
//! Pipeline (§4.2-4.4).

pub mod client;
pub mod error;
pub mod executor;
pub mod resolver;
pub mod stream;

pub use client::{build_client, PgrestClientConfig};
pub use error::ClientError;
pub use executor::Executor;
pub use resolver::Resolver;
pub use stream::StreamingPipeline;
