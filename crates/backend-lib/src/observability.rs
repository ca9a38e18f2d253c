//! Observability infrastructure for the CarbonWise backend
//!
//! Provides:
//! - Prometheus metrics (request latencies, sample drops, upstream errors)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, Histogram, IntCounter,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for outbound-call latencies (in seconds). Estimation
/// spans three sequential upstream calls plus fixed delays.
const LATENCY_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<BackendMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct BackendMetricsInner {
    estimation_latency_seconds: Histogram,
    tips_latency_seconds: Histogram,
    detection_latency_seconds: Histogram,
    estimations_total: IntCounter,
    estimation_failures_total: IntCounter,
    samples_discarded_total: IntCounter,
    upstream_errors_total: IntCounter,
}

impl BackendMetricsInner {
    fn new() -> Self {
        Self {
            estimation_latency_seconds: register_histogram!(
                "carbonwise_backend_estimation_latency_seconds",
                "Time spent serving one footprint estimation, sampling calls included",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register estimation_latency_seconds"),

            tips_latency_seconds: register_histogram!(
                "carbonwise_backend_tips_latency_seconds",
                "Time spent serving one reduction-tips request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register tips_latency_seconds"),

            detection_latency_seconds: register_histogram!(
                "carbonwise_backend_detection_latency_seconds",
                "Time spent serving one object-detection request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register detection_latency_seconds"),

            estimations_total: register_int_counter!(
                "carbonwise_backend_estimations_total",
                "Total number of footprint estimates produced"
            )
            .expect("Failed to register estimations_total"),

            estimation_failures_total: register_int_counter!(
                "carbonwise_backend_estimation_failures_total",
                "Estimations where every sampling call failed or was unparsable"
            )
            .expect("Failed to register estimation_failures_total"),

            samples_discarded_total: register_int_counter!(
                "carbonwise_backend_samples_discarded_total",
                "Sampling calls dropped because they errored or returned unparsable text"
            )
            .expect("Failed to register samples_discarded_total"),

            upstream_errors_total: register_int_counter!(
                "carbonwise_backend_upstream_errors_total",
                "Failed round trips to the generative-text or vision services"
            )
            .expect("Failed to register upstream_errors_total"),
        }
    }
}

/// Backend metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct BackendMetrics {
    _private: (),
}

impl Default for BackendMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(BackendMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &BackendMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record the latency of one full estimation
    pub fn observe_estimation_latency(&self, duration_secs: f64) {
        self.inner().estimation_latency_seconds.observe(duration_secs);
    }

    /// Record the latency of one reduction-tips request
    pub fn observe_tips_latency(&self, duration_secs: f64) {
        self.inner().tips_latency_seconds.observe(duration_secs);
    }

    /// Record the latency of one object-detection request
    pub fn observe_detection_latency(&self, duration_secs: f64) {
        self.inner().detection_latency_seconds.observe(duration_secs);
    }

    /// Increment the produced-estimates counter
    pub fn inc_estimations(&self) {
        self.inner().estimations_total.inc();
    }

    /// Increment the whole-estimation failure counter
    pub fn inc_estimation_failures(&self) {
        self.inner().estimation_failures_total.inc();
    }

    /// Increment the dropped-sample counter
    pub fn inc_samples_discarded(&self) {
        self.inner().samples_discarded_total.inc();
    }

    /// Increment the upstream-error counter
    pub fn inc_upstream_errors(&self) {
        self.inner().upstream_errors_total.inc();
    }
}

/// Structured logger for backend events
///
/// Provides consistent JSON-formatted logging for estimations, tips,
/// detections, and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    model: String,
}

impl StructuredLogger {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Log a completed footprint estimation
    pub fn log_estimation(&self, product_name: &str, sample_count: usize, footprint_kg: i64) {
        info!(
            event = "estimation_completed",
            model = %self.model,
            product_name = %product_name,
            sample_count = sample_count,
            footprint_kg = footprint_kg,
            "Carbon footprint estimated"
        );
    }

    /// Log a served reduction-tips request
    pub fn log_tips(&self, product_specific: bool) {
        info!(
            event = "tips_served",
            model = %self.model,
            product_specific = product_specific,
            "Reduction tips served"
        );
    }

    /// Log a completed object detection
    pub fn log_detection(&self, label_count: usize) {
        info!(
            event = "objects_detected",
            label_count = label_count,
            "Object detection completed"
        );
    }

    /// Log an upstream service failure
    pub fn log_upstream_error(&self, service: &str, error: &str) {
        warn!(
            event = "upstream_error",
            service = %service,
            error = %error,
            "Upstream service call failed"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "backend_started",
            backend_version = %version,
            model = %self.model,
            "CarbonWise backend started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "backend_shutdown",
            reason = %reason,
            "CarbonWise backend shutting down"
        );
    }
}
