//! HTTP API for estimation, tips, object detection, health, and metrics

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use backend_lib::{
    error::EstimationError,
    estimator::FootprintEstimator,
    health::{components, ComponentStatus, HealthRegistry},
    models::ProductDescriptor,
    observability::{BackendMetrics, StructuredLogger},
    vision::ObjectDetection,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Body limit raised for base64 image payloads
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Literal response text when the vision service recognizes nothing
pub const NO_OBJECTS_MESSAGE: &str = "No objects detected. Try another image.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub estimator: Arc<FootprintEstimator>,
    /// Absent when no vision credential is configured
    pub detector: Option<Arc<dyn ObjectDetection>>,
    pub health_registry: HealthRegistry,
    pub metrics: BackendMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        estimator: Arc<FootprintEstimator>,
        detector: Option<Arc<dyn ObjectDetection>>,
        health_registry: HealthRegistry,
        metrics: BackendMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            estimator,
            detector,
            health_registry,
            metrics,
            logger,
        }
    }
}

#[derive(Serialize)]
struct FootprintResponse {
    footprint: String,
    values: Vec<f64>,
    prompt: String,
}

#[derive(Serialize)]
struct TipsResponse {
    tips: String,
    prompt: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(Deserialize)]
struct DetectionRequest {
    #[serde(rename = "base64Image")]
    base64_image: Option<String>,
}

#[derive(Serialize)]
struct DetectionResponse {
    success: bool,
    objects: String,
}

#[derive(Serialize)]
struct DetectionErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

async fn root() -> &'static str {
    "Welcome to CarbonWise!"
}

/// Estimate the carbon footprint of a described product
async fn calculate_carbon_footprint(
    State(state): State<Arc<AppState>>,
    Json(descriptor): Json<ProductDescriptor>,
) -> Response {
    match state.estimator.estimate(&descriptor).await {
        Ok(estimate) => {
            state
                .health_registry
                .set_healthy(components::TEXT_GENERATION)
                .await;
            state.logger.log_estimation(
                descriptor.trimmed_product_name().unwrap_or(""),
                estimate.values.len(),
                estimate.footprint_kg,
            );

            (
                StatusCode::OK,
                Json(FootprintResponse {
                    footprint: estimate.footprint_label(),
                    values: estimate.values,
                    prompt: estimate.prompt,
                }),
            )
                .into_response()
        }
        Err(err @ EstimationError::MissingProductName) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(err.to_string())),
        )
            .into_response(),
        Err(err @ EstimationError::NoSamples) => {
            state
                .health_registry
                .set_degraded(
                    components::TEXT_GENERATION,
                    "All sampling calls failed or were unparsable",
                )
                .await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(err.to_string())),
            )
                .into_response()
        }
        Err(EstimationError::Upstream(err)) => {
            state
                .health_registry
                .set_degraded(components::TEXT_GENERATION, err.to_string())
                .await;
            state
                .logger
                .log_upstream_error(components::TEXT_GENERATION, &err.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_details(
                    "Failed to calculate carbon footprint",
                    err.to_string(),
                )),
            )
                .into_response()
        }
    }
}

/// Ask the model for footprint-reduction tips, product-specific when a
/// descriptor with a product name is sent
async fn reduce_carbon_footprint(
    State(state): State<Arc<AppState>>,
    descriptor: Option<Json<ProductDescriptor>>,
) -> Response {
    let descriptor = descriptor.map(|Json(d)| d);
    let product_specific = descriptor
        .as_ref()
        .and_then(|d| d.trimmed_product_name())
        .is_some();

    match state.estimator.reduction_tips(descriptor.as_ref()).await {
        Ok(tips) => {
            state
                .health_registry
                .set_healthy(components::TEXT_GENERATION)
                .await;
            state.logger.log_tips(product_specific);

            (
                StatusCode::OK,
                Json(TipsResponse {
                    tips: tips.tips,
                    prompt: tips.prompt,
                }),
            )
                .into_response()
        }
        Err(err) => {
            state
                .health_registry
                .set_degraded(components::TEXT_GENERATION, err.to_string())
                .await;
            state
                .logger
                .log_upstream_error(components::TEXT_GENERATION, &err.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_details(
                    "Failed to get tips for reducing carbon footprint",
                    err.to_string(),
                )),
            )
                .into_response()
        }
    }
}

/// Forward a base64 image to the vision service and return detected labels
async fn detect_objects(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DetectionRequest>,
) -> Response {
    let Some(base64_image) = request.base64_image.filter(|image| !image.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(DetectionErrorResponse {
                success: false,
                message: "Missing base64Image in the request body".to_string(),
                details: None,
            }),
        )
            .into_response();
    };

    let Some(detector) = state.detector.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(DetectionErrorResponse {
                success: false,
                message: "Vision API key not found in server configuration".to_string(),
                details: None,
            }),
        )
            .into_response();
    };

    let start = Instant::now();
    match detector.detect(&base64_image).await {
        Ok(objects) => {
            state
                .metrics
                .observe_detection_latency(start.elapsed().as_secs_f64());
            state.health_registry.set_healthy(components::VISION).await;
            state.logger.log_detection(objects.labels.len());

            let objects = if objects.is_empty() {
                NO_OBJECTS_MESSAGE.to_string()
            } else {
                objects.joined()
            };

            (
                StatusCode::OK,
                Json(DetectionResponse {
                    success: true,
                    objects,
                }),
            )
                .into_response()
        }
        Err(err) => {
            state.metrics.inc_upstream_errors();
            state
                .health_registry
                .set_degraded(components::VISION, err.to_string())
                .await;
            state
                .logger
                .log_upstream_error(components::VISION, &err.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DetectionErrorResponse {
                    success: false,
                    message: "An error occurred while analyzing the image".to_string(),
                    details: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Health check response - returns 200 if healthy, 503 if degraded/unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/calculate-carbon-footprint", post(calculate_carbon_footprint))
        .route("/reduce-carbon-footprint", post(reduce_carbon_footprint))
        .route("/detect-objects", post(detect_objects))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
