//! Carbon-footprint estimation engine

mod extract;
mod prompt;
mod sampling;

pub use extract::{extract_kg_co2e, SampleExtractor};
pub use prompt::{estimation_prompt, reduction_prompt};
pub use sampling::{
    Delay, EstimatorConfig, FootprintEstimator, TokioDelay, SAMPLE_ATTEMPTS, SAMPLE_DELAY,
};
