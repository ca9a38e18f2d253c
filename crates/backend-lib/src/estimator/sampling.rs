//! Sampling loop that stabilizes a noisy single-completion estimate
//!
//! One language-model call gives a noisy number; the estimator issues a
//! fixed number of sequential calls with the identical prompt and averages
//! whatever parses. Individual call failures drop the sample and keep the
//! loop going.

use super::extract::{extract_kg_co2e, SampleExtractor};
use super::prompt;
use crate::error::EstimationError;
use crate::generative::{GenerationRequest, TextGeneration};
use crate::models::{FootprintEstimate, ProductDescriptor, ReductionTips};
use crate::observability::BackendMetrics;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Fixed number of sampling calls per estimation
pub const SAMPLE_ATTEMPTS: usize = 3;

/// Pause between consecutive sampling calls. Crude rate limiting toward the
/// upstream service, not a correctness requirement.
pub const SAMPLE_DELAY: Duration = Duration::from_secs(1);

/// Low temperature keeps the numeric answers close together
const SAMPLE_TEMPERATURE: f32 = 0.2;

/// Enough output budget for a single short numeric phrase
const SAMPLE_MAX_OUTPUT_TOKENS: u32 = 20;

/// Tips are free text, so a higher temperature reads better
const TIPS_TEMPERATURE: f32 = 0.7;

/// Output budget for roughly 200 words of tips
const TIPS_MAX_OUTPUT_TOKENS: u32 = 200;

/// Configuration for the estimation sampling loop
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Number of sequential sampling calls per estimation
    pub sample_attempts: usize,
    /// Pause inserted between sampling calls, except after the last
    pub sample_delay: Duration,
    /// Sampling temperature for estimation calls
    pub sample_temperature: f32,
    /// Output-token cap for estimation calls
    pub sample_max_output_tokens: u32,
    /// Sampling temperature for reduction-tips calls
    pub tips_temperature: f32,
    /// Output-token cap for reduction-tips calls
    pub tips_max_output_tokens: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            sample_attempts: SAMPLE_ATTEMPTS,
            sample_delay: SAMPLE_DELAY,
            sample_temperature: SAMPLE_TEMPERATURE,
            sample_max_output_tokens: SAMPLE_MAX_OUTPUT_TOKENS,
            tips_temperature: TIPS_TEMPERATURE,
            tips_max_output_tokens: TIPS_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Trait for the inter-call pause, so tests run without real time
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Delay backed by the tokio timer
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Carbon-footprint estimator over an injected text-generation client
pub struct FootprintEstimator {
    generator: Arc<dyn TextGeneration>,
    delay: Arc<dyn Delay>,
    extract: SampleExtractor,
    config: EstimatorConfig,
    metrics: BackendMetrics,
}

impl FootprintEstimator {
    /// Create an estimator with default configuration
    pub fn new(generator: Arc<dyn TextGeneration>) -> Self {
        Self::with_config(generator, EstimatorConfig::default())
    }

    /// Create an estimator with explicit configuration
    pub fn with_config(generator: Arc<dyn TextGeneration>, config: EstimatorConfig) -> Self {
        Self {
            generator,
            delay: Arc::new(TokioDelay),
            extract: extract_kg_co2e,
            config,
            metrics: BackendMetrics::new(),
        }
    }

    /// Replace the inter-call delay implementation
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the sample-extraction strategy
    pub fn with_extractor(mut self, extract: SampleExtractor) -> Self {
        self.extract = extract;
        self
    }

    /// Estimate the carbon footprint for a product descriptor.
    ///
    /// Issues `sample_attempts` sequential calls with the identical prompt
    /// and returns the rounded mean of every sample that parsed. Fails
    /// before any remote call when the product name is missing, and fails
    /// with [`EstimationError::NoSamples`] when nothing parsed.
    pub async fn estimate(
        &self,
        descriptor: &ProductDescriptor,
    ) -> Result<FootprintEstimate, EstimationError> {
        let product_name = descriptor
            .trimmed_product_name()
            .ok_or(EstimationError::MissingProductName)?;

        let prompt = prompt::estimation_prompt(product_name, descriptor);
        let request = GenerationRequest {
            prompt: prompt.clone(),
            temperature: self.config.sample_temperature,
            max_output_tokens: self.config.sample_max_output_tokens,
        };

        let start = Instant::now();
        let mut values = Vec::with_capacity(self.config.sample_attempts);

        for attempt in 0..self.config.sample_attempts {
            match self.generator.generate(&request).await {
                Ok(text) => match (self.extract)(&text) {
                    Some(value) => {
                        debug!(attempt, value, "Sample collected");
                        values.push(value);
                    }
                    None => {
                        // A response without a parsable value drops the
                        // sample; the loop keeps going.
                        self.metrics.inc_samples_discarded();
                        warn!(attempt, response = %text, "Response carried no parsable footprint value");
                    }
                },
                Err(err) => {
                    self.metrics.inc_samples_discarded();
                    self.metrics.inc_upstream_errors();
                    warn!(attempt, error = %err, "Sampling call failed");
                }
            }

            if attempt + 1 < self.config.sample_attempts {
                self.delay.sleep(self.config.sample_delay).await;
            }
        }

        self.metrics
            .observe_estimation_latency(start.elapsed().as_secs_f64());

        if values.is_empty() {
            self.metrics.inc_estimation_failures();
            return Err(EstimationError::NoSamples);
        }

        self.metrics.inc_estimations();
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        Ok(FootprintEstimate {
            footprint_kg: mean.round() as i64,
            values,
            prompt,
        })
    }

    /// Ask the model for footprint-reduction tips.
    ///
    /// One call, no parsing, no averaging; the raw response text is
    /// returned unmodified. A missing descriptor (or one without a product
    /// name) yields the generic prompt.
    pub async fn reduction_tips(
        &self,
        descriptor: Option<&ProductDescriptor>,
    ) -> Result<ReductionTips, EstimationError> {
        let prompt = prompt::reduction_prompt(descriptor);
        let request = GenerationRequest {
            prompt: prompt.clone(),
            temperature: self.config.tips_temperature,
            max_output_tokens: self.config.tips_max_output_tokens,
        };

        let start = Instant::now();
        let result = self.generator.generate(&request).await;
        self.metrics
            .observe_tips_latency(start.elapsed().as_secs_f64());

        let tips = result.map_err(|err| {
            self.metrics.inc_upstream_errors();
            err
        })?;

        Ok(ReductionTips { tips, prompt })
    }
}
