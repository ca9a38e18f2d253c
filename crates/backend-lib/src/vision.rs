//! Client for the image-object-detection service
//!
//! A single passthrough call: base64 image in, detected object labels out.
//! There is no retry or aggregation on this path.

use crate::error::UpstreamError;
use crate::models::DetectedObjects;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default Vision API endpoint
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com";

/// Maximum object annotations requested per image
pub const MAX_DETECTION_RESULTS: u32 = 10;

/// Trait for object-detection implementations
#[async_trait]
pub trait ObjectDetection: Send + Sync {
    /// Detect objects in a base64-encoded image. An image with nothing
    /// recognizable yields an empty label list, not an error.
    async fn detect(&self, base64_image: &str) -> Result<DetectedObjects, UpstreamError>;
}

/// Configuration for the Vision HTTP client
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// API endpoint base URL
    pub endpoint: String,
    /// API key passed as a query parameter
    pub api_key: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Vision images:annotate API
pub struct VisionClient {
    config: VisionConfig,
    http: reqwest::Client,
}

impl VisionClient {
    /// Create a new client with the given configuration
    pub fn new(config: VisionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client for the vision service")?;
        Ok(Self { config, http })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1/images:annotate?key={}",
            self.config.endpoint, self.config.api_key
        )
    }
}

#[async_trait]
impl ObjectDetection for VisionClient {
    async fn detect(&self, base64_image: &str) -> Result<DetectedObjects, UpstreamError> {
        let body = json!({
            "requests": [{
                "image": { "content": base64_image },
                "features": [{
                    "type": "OBJECT_LOCALIZATION",
                    "maxResults": MAX_DETECTION_RESULTS,
                }],
            }],
        });

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
        let labels = labels_from_response(&json);

        debug!(label_count = labels.len(), "Detection completed");

        Ok(DetectedObjects { labels })
    }
}

/// Pull object names out of an images:annotate response. An absent or empty
/// annotation list means nothing was recognized.
fn labels_from_response(json: &serde_json::Value) -> Vec<String> {
    json.pointer("/responses/0/localizedObjectAnnotations")
        .and_then(|a| a.as_array())
        .map(|annotations| {
            annotations
                .iter()
                .filter_map(|obj| obj.get("name").and_then(|n| n.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_embeds_key() {
        let client = VisionClient::new(VisionConfig {
            endpoint: "https://example.test".to_string(),
            api_key: "secret".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();

        assert_eq!(
            client.request_url(),
            "https://example.test/v1/images:annotate?key=secret"
        );
    }

    #[test]
    fn test_labels_extracted_from_annotations() {
        let json = json!({
            "responses": [{
                "localizedObjectAnnotations": [
                    { "name": "Laptop", "score": 0.92 },
                    { "name": "Table", "score": 0.61 },
                ],
            }],
        });

        assert_eq!(labels_from_response(&json), vec!["Laptop", "Table"]);
    }

    #[test]
    fn test_missing_annotation_list_is_no_objects() {
        assert!(labels_from_response(&json!({ "responses": [{}] })).is_empty());
        assert!(labels_from_response(&json!({})).is_empty());
    }
}
