use std::path::PathBuf;
use tabular_api::server::ServerConfig;
use tabular_api::{build_router, telemetry, AppState};
use tabular_client::{build_client, PgrestClientConfig};
use tabular_common::GatewayConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let override_path = std::env::var("TABULAR_CONFIG_PATH").ok().map(PathBuf::from);
    let config = GatewayConfig::load(override_path.as_deref())?;

    telemetry::init(&config)?;

    let http = build_client(&PgrestClientConfig::default())?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8006".to_string());
    let state = AppState::new(config, http);
    let router = build_router(state);

    tabular_api::server::run(router, ServerConfig::new(bind_addr)).await?;
    telemetry::shutdown();
    Ok(())
}
