//! Backend library for the CarbonWise service
//!
//! This crate provides the core functionality for:
//! - Carbon-footprint estimation via repeated text-generation sampling
//! - Prompt construction from product descriptors
//! - Numeric extraction from free-text model responses
//! - Upstream clients for the generative-text and vision services
//! - Health checks and observability

pub mod error;
pub mod estimator;
pub mod generative;
pub mod health;
pub mod models;
pub mod observability;
pub mod vision;

pub use error::{EstimationError, UpstreamError};
pub use estimator::{EstimatorConfig, FootprintEstimator};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{BackendMetrics, StructuredLogger};
