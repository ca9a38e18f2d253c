//! Backend configuration

use anyhow::Result;
use serde::Deserialize;

/// Backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Generative Language API endpoint
    #[serde(default = "default_generative_endpoint")]
    pub generative_endpoint: String,

    /// Generative model identifier
    #[serde(default = "default_generative_model")]
    pub generative_model: String,

    /// Generative Language API key. A missing key logs a startup warning;
    /// calls are still attempted and fail upstream.
    #[serde(default = "default_generative_api_key")]
    pub generative_api_key: Option<String>,

    /// Vision API endpoint
    #[serde(default = "default_vision_endpoint")]
    pub vision_endpoint: String,

    /// Vision API key. A missing key surfaces as a 500 on /detect-objects.
    #[serde(default = "default_vision_api_key")]
    pub vision_api_key: Option<String>,

    /// Per-request timeout toward upstream services, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_port() -> u16 {
    3000
}

fn default_generative_endpoint() -> String {
    backend_lib::generative::DEFAULT_GENERATIVE_ENDPOINT.to_string()
}

fn default_generative_model() -> String {
    backend_lib::generative::DEFAULT_GENERATIVE_MODEL.to_string()
}

fn default_generative_api_key() -> Option<String> {
    std::env::var("API_KEY").ok()
}

fn default_vision_endpoint() -> String {
    backend_lib::vision::DEFAULT_VISION_ENDPOINT.to_string()
}

fn default_vision_api_key() -> Option<String> {
    std::env::var("VISION_API_KEY").ok()
}

fn default_request_timeout() -> u64 {
    30
}

impl BackendConfig {
    /// Load configuration from `BACKEND_`-prefixed environment variables,
    /// falling back to the bare `API_KEY` / `VISION_API_KEY` variables the
    /// deployment environment already carries.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("BACKEND"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| BackendConfig {
            api_port: default_api_port(),
            generative_endpoint: default_generative_endpoint(),
            generative_model: default_generative_model(),
            generative_api_key: default_generative_api_key(),
            vision_endpoint: default_vision_endpoint(),
            vision_api_key: default_vision_api_key(),
            request_timeout_secs: default_request_timeout(),
        }))
    }
}
