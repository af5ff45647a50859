//! Structured logging and optional OTLP export (§6.3, §10.3). The
//! `observability` feature mirrors `data_bridge_tasks::tracing_support`'s
//! OTLP pipeline setup; without it (or without a configured DSN) the
//! process falls back to a plain `tracing_subscriber::fmt` layer and
//! the per-request correlation id stands in for a trace id.

use tabular_common::GatewayConfig;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(feature = "observability")]
pub fn init(config: &GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::Resource;
    use tracing_subscriber::prelude::*;

    let Some(dsn) = config.telemetry_dsn.as_deref() else {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        return Ok(());
    };

    let resource = Resource::new(vec![
        KeyValue::new("service.name", "tabular-gateway"),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let exporter = opentelemetry_otlp::new_exporter().tonic().with_endpoint(dsn);
    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::config()
                .with_resource(resource)
                .with_sampler(opentelemetry_sdk::trace::Sampler::TraceIdRatioBased(
                    config.telemetry_sample_rate,
                )),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .init();
    Ok(())
}

#[cfg(not(feature = "observability"))]
pub fn init(_config: &GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
    Ok(())
}

#[cfg(feature = "observability")]
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "observability"))]
pub fn shutdown() {}
