//! Shared, connection-pooled HTTP client construction.
//!
//! One `reqwest::Client` is built at startup and handed to every
//! request-scoped collaborator (`Resolver`, `Executor`,
//! `StreamingPipeline`) by cloning this wrapper — `reqwest::Client`
//! itself is an `Arc` internally, so cloning is cheap and the
//! connection pool is shared, never rebuilt per request.

use std::time::Duration;

/// Tuning knobs for the pooled client; mirrors the fields a production
/// gateway actually needs from its upstream connection, not a generic
/// HTTP client surface.
#[derive(Debug, Clone)]
pub struct PgrestClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub gzip: bool,
    pub brotli: bool,
    pub user_agent: String,
}

impl Default for PgrestClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            gzip: true,
            brotli: true,
            user_agent: format!("tabular-gateway/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builds the single `reqwest::Client` shared by the process.
pub fn build_client(config: &PgrestClientConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout)
        .gzip(config.gzip)
        .brotli(config.brotli)
        .user_agent(&config.user_agent)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_client() {
        let config = PgrestClientConfig::default();
        assert!(build_client(&config).is_ok());
    }
}
