//! CarbonWise backend - carbon-footprint estimation service
//!
//! This binary serves the mobile client's HTTP API, forwarding product
//! descriptions to a generative-text model and images to an
//! object-detection service.

use anyhow::Result;
use backend_lib::{
    estimator::FootprintEstimator,
    generative::{GeminiClient, GeminiConfig},
    health::{components, HealthRegistry},
    observability::{BackendMetrics, StructuredLogger},
    vision::{ObjectDetection, VisionClient, VisionConfig},
};
use carbonwise_backend::{api, config};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const BACKEND_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting carbonwise-backend");

    // Load configuration
    let config = config::BackendConfig::load()?;
    info!(model = %config.generative_model, "Backend configured");

    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    if config.generative_api_key.is_none() {
        warn!("Generative API key is missing; estimation calls will fail upstream");
    }

    // Construct the upstream clients explicitly and inject them; nothing
    // here is global, so tests substitute doubles freely.
    let generator = GeminiClient::new(GeminiConfig {
        endpoint: config.generative_endpoint.clone(),
        model: config.generative_model.clone(),
        api_key: config.generative_api_key.clone().unwrap_or_default(),
        request_timeout,
    })?;
    let estimator = Arc::new(FootprintEstimator::new(Arc::new(generator)));

    let detector: Option<Arc<dyn ObjectDetection>> = match &config.vision_api_key {
        Some(api_key) => {
            let client = VisionClient::new(VisionConfig {
                endpoint: config.vision_endpoint.clone(),
                api_key: api_key.clone(),
                request_timeout,
            })?;
            Some(Arc::new(client))
        }
        None => {
            warn!("Vision API key is missing; /detect-objects will return errors");
            None
        }
    };

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::TEXT_GENERATION).await;
    health_registry.register(components::VISION).await;
    if detector.is_none() {
        health_registry
            .set_degraded(components::VISION, "API key not configured")
            .await;
    }

    // Initialize metrics
    let metrics = BackendMetrics::new();

    // Initialize structured logger
    let logger = StructuredLogger::new(&config.generative_model);
    logger.log_startup(BACKEND_VERSION);

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        estimator,
        detector,
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    // Mark backend as ready after initialization
    health_registry.set_ready(true).await;

    // Start the API server
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    api_handle.abort();

    Ok(())
}
