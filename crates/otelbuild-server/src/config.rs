// Runtime configuration for the server binary
//
// Sources, highest priority first: CLI flags, OTELBUILD_* environment
// variables, built-in defaults. The submission handler itself consumes no
// environment; this is assembly-only configuration.

use std::fmt;
use std::str::FromStr;

/// Server runtime configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// OTLP/gRPC endpoint for span export. Spans stay no-op when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            otlp_endpoint: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with any OTELBUILD_* environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("OTELBUILD_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(level) = std::env::var("OTELBUILD_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Ok(format) = std::env::var("OTELBUILD_LOG_FORMAT") {
            if let Ok(format) = format.parse() {
                config.log_format = format;
            }
        }
        if let Ok(endpoint) = std::env::var("OTELBUILD_OTLP_ENDPOINT") {
            config.otlp_endpoint = Some(endpoint);
        }

        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "unknown log format '{other}', expected 'text' or 'json'"
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}
