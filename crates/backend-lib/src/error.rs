//! Error taxonomy for the estimation and upstream-client layers

use thiserror::Error;

/// Failure of a single round trip to an upstream service.
///
/// Network errors, non-success statuses, and malformed bodies are all call
/// failures; the caller decides whether one failed call is fatal.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Terminal errors surfaced by the estimation operations
#[derive(Debug, Error)]
pub enum EstimationError {
    /// Required input missing; surfaced before any remote call is made
    #[error("Product is required in the request body")]
    MissingProductName,

    /// Every sampling call either errored or returned unparsable text.
    /// The two cases are intentionally not distinguished.
    #[error("Failed to parse carbon footprint values from the responses")]
    NoSamples,

    /// Single-call operations propagate upstream failures directly
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
