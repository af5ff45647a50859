//! Process-wide immutable configuration snapshot (spec §6.3, §9).
//!
//! Loaded once at startup: shipped defaults, optionally overlaid by a
//! TOML file, then per-key environment variable overrides coerced to
//! the default field's type. Follows the override order described for
//! the distilled-from service's `Configurator` class.

use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub pgrest_endpoint: String,
    pub scheme: String,
    pub server_name: String,
    pub page_size_default: u32,
    pub page_size_max: u32,
    pub batch_size: usize,
    pub allow_aggregation: Vec<String>,
    pub doc_path: String,
    pub telemetry_dsn: Option<String>,
    pub telemetry_sample_rate: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            pgrest_endpoint: "localhost:3000".to_string(),
            scheme: "http".to_string(),
            server_name: "localhost:8080".to_string(),
            page_size_default: 50,
            page_size_max: 1000,
            batch_size: 10_000,
            allow_aggregation: Vec::new(),
            doc_path: "/apidoc".to_string(),
            telemetry_dsn: None,
            telemetry_sample_rate: 1.0,
        }
    }
}

/// Shape of the on-disk TOML file; every key optional so a partial
/// override file only touches the keys it names.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(rename = "PGREST_ENDPOINT")]
    pgrest_endpoint: Option<String>,
    #[serde(rename = "SCHEME")]
    scheme: Option<String>,
    #[serde(rename = "SERVER_NAME")]
    server_name: Option<String>,
    #[serde(rename = "PAGE_SIZE_DEFAULT")]
    page_size_default: Option<u32>,
    #[serde(rename = "PAGE_SIZE_MAX")]
    page_size_max: Option<u32>,
    #[serde(rename = "BATCH_SIZE")]
    batch_size: Option<usize>,
    #[serde(rename = "ALLOW_AGGREGATION")]
    allow_aggregation: Option<Vec<String>>,
    #[serde(rename = "DOC_PATH")]
    doc_path: Option<String>,
    #[serde(rename = "TELEMETRY_DSN")]
    telemetry_dsn: Option<String>,
    #[serde(rename = "TELEMETRY_SAMPLE_RATE")]
    telemetry_sample_rate: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl GatewayConfig {
    /// Load defaults, overlay an optional TOML file, then apply
    /// environment variable overrides. `override_path` is skipped
    /// silently if it does not exist (the file is opt-in).
    pub fn load(override_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(path) = override_path {
            if path.exists() {
                let text =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                let partial: PartialConfig =
                    toml::from_str(&text).map_err(|source| ConfigError::Parse {
                        path: path.display().to_string(),
                        source,
                    })?;
                cfg.apply_partial(partial);
            }
        }

        cfg.apply_env();
        cfg.normalize_endpoint();
        Ok(cfg)
    }

    fn apply_partial(&mut self, p: PartialConfig) {
        if let Some(v) = p.pgrest_endpoint {
            self.pgrest_endpoint = v;
        }
        if let Some(v) = p.scheme {
            self.scheme = v;
        }
        if let Some(v) = p.server_name {
            self.server_name = v;
        }
        if let Some(v) = p.page_size_default {
            self.page_size_default = v;
        }
        if let Some(v) = p.page_size_max {
            self.page_size_max = v;
        }
        if let Some(v) = p.batch_size {
            self.batch_size = v;
        }
        if let Some(v) = p.allow_aggregation {
            self.allow_aggregation = v;
        }
        if let Some(v) = p.doc_path {
            self.doc_path = v;
        }
        if let Some(v) = p.telemetry_dsn {
            self.telemetry_dsn = Some(v);
        }
        if let Some(v) = p.telemetry_sample_rate {
            self.telemetry_sample_rate = v;
        }
    }

    /// Each key is overridable by an environment variable of the same
    /// name, coerced to the default field's type: comma-split list,
    /// numeric parse. A malformed numeric override is ignored rather
    /// than aborting startup.
    fn apply_env(&mut self) {
        if let Ok(v) = env::var("PGREST_ENDPOINT") {
            self.pgrest_endpoint = v;
        }
        if let Ok(v) = env::var("SCHEME") {
            self.scheme = v;
        }
        if let Ok(v) = env::var("SERVER_NAME") {
            self.server_name = v;
        }
        if let Ok(v) = env::var("PAGE_SIZE_DEFAULT") {
            if let Ok(n) = v.parse() {
                self.page_size_default = n;
            }
        }
        if let Ok(v) = env::var("PAGE_SIZE_MAX") {
            if let Ok(n) = v.parse() {
                self.page_size_max = n;
            }
        }
        if let Ok(v) = env::var("BATCH_SIZE") {
            if let Ok(n) = v.parse() {
                self.batch_size = n;
            }
        }
        if let Ok(v) = env::var("ALLOW_AGGREGATION") {
            self.allow_aggregation = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(v) = env::var("DOC_PATH") {
            self.doc_path = v;
        }
        if let Ok(v) = env::var("TELEMETRY_DSN") {
            self.telemetry_dsn = Some(v);
        }
        if let Ok(v) = env::var("TELEMETRY_SAMPLE_RATE") {
            if let Ok(f) = v.parse() {
                self.telemetry_sample_rate = f;
            }
        }
    }

    fn normalize_endpoint(&mut self) {
        if !self.pgrest_endpoint.starts_with("http://")
            && !self.pgrest_endpoint.starts_with("https://")
        {
            self.pgrest_endpoint = format!("http://{}", self.pgrest_endpoint);
        }
    }

    pub fn is_aggregation_allowed(&self, resource_id: &str) -> bool {
        self.allow_aggregation.iter().any(|r| r == resource_id)
    }

    /// The externally visible base URL used to mint absolute links.
    pub fn external_base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.server_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_gets_http_scheme() {
        let cfg = GatewayConfig::load(None).unwrap();
        assert_eq!(cfg.pgrest_endpoint, "http://localhost:3000");
    }

    #[test]
    fn env_override_coerces_list() {
        env::set_var("ALLOW_AGGREGATION", "res-a, res-b,res-c");
        let cfg = GatewayConfig::load(None).unwrap();
        assert_eq!(
            cfg.allow_aggregation,
            vec!["res-a".to_string(), "res-b".to_string(), "res-c".to_string()]
        );
        env::remove_var("ALLOW_AGGREGATION");
    }

    #[test]
    fn env_override_coerces_int() {
        env::set_var("PAGE_SIZE_MAX", "250");
        let cfg = GatewayConfig::load(None).unwrap();
        assert_eq!(cfg.page_size_max, 250);
        env::remove_var("PAGE_SIZE_MAX");
    }

    #[test]
    fn malformed_override_file_errors() {
        let dir = std::env::temp_dir().join("tabular-gateway-test-config-bad.toml");
        std::fs::write(&dir, "not valid = [toml").unwrap();
        let result = GatewayConfig::load(Some(&dir));
        assert!(result.is_err());
        let _ = std::fs::remove_file(&dir);
    }
}
