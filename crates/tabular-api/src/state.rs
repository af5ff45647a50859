//! Shared application state handed to every handler via `State`.

use std::sync::Arc;
use std::time::Instant;
use tabular_client::{Executor, Resolver, StreamingPipeline};
use tabular_common::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub http: reqwest::Client,
    pub resolver: Resolver,
    pub executor: Executor,
    pub streaming: StreamingPipeline,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: GatewayConfig, http: reqwest::Client) -> Self {
        let base = config.pgrest_endpoint.clone();
        let resolver = Resolver::new(http.clone(), base.clone());
        let executor = Executor::new(http.clone(), base.clone());
        let streaming = StreamingPipeline::new(http.clone(), base, config.batch_size as u64);
        Self {
            config: Arc::new(config),
            http,
            resolver,
            executor,
            streaming,
            start_time: Instant::now(),
        }
    }
}
