//! Client for the generative-text service
//!
//! Wraps the hosted Gemini `generateContent` endpoint behind a trait so the
//! estimator can be exercised against a test double. One request maps to one
//! completion; sampling policy lives in the estimator, not here.

use crate::error::UpstreamError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default Generative Language API endpoint
pub const DEFAULT_GENERATIVE_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model used for both estimation sampling and reduction tips
pub const DEFAULT_GENERATIVE_MODEL: &str = "gemini-1.5-flash";

/// One completion request to the text-generation service
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Trait for text-generation implementations
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Issue one completion request and return the raw response text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, UpstreamError>;
}

/// Configuration for the Gemini HTTP client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API endpoint base URL
    pub endpoint: String,
    /// Model identifier, e.g. "gemini-1.5-flash"
    pub model: String,
    /// API key passed as a query parameter. An empty key still issues the
    /// call and surfaces the upstream auth failure.
    pub api_key: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GENERATIVE_ENDPOINT.to_string(),
            model: DEFAULT_GENERATIVE_MODEL.to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct GenerateContentBody<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// HTTP client for the Gemini generateContent API
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client with the given configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client for the generative service")?;
        Ok(Self { config, http })
    }

    /// The model this client targets
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.config.api_key
        )
    }
}

#[async_trait]
impl TextGeneration for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, UpstreamError> {
        let body = GenerateContentBody {
            contents: [Content {
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.request_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let json: serde_json::Value = response.json().await?;
        let text = json
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                UpstreamError::Malformed("no candidate text in generateContent response".into())
            })?;

        debug!(
            model = %self.config.model,
            response_chars = text.len(),
            "Generation completed"
        );

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, DEFAULT_GENERATIVE_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_request_url_embeds_model_and_key() {
        let client = GeminiClient::new(GeminiConfig {
            endpoint: "https://example.test".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: "secret".to_string(),
            ..GeminiConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.request_url(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn test_body_serializes_to_generate_content_shape() {
        let body = GenerateContentBody {
            contents: [Content {
                parts: [Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 20,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 20);
    }
}
