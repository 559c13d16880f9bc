use crate::ml::FeatureLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model artifact configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: RKT_)
            .add_source(
                config::Environment::with_prefix("RKT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Socket address the HTTP server binds to
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path of the serialized model artifact, read once at startup
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// Feature order the artifact was trained on
    #[serde(default)]
    pub feature_layout: FeatureLayout,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            feature_layout: FeatureLayout::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model_rf.bin")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
