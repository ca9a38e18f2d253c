//! CarbonWise backend service
//!
//! HTTP API that forwards product descriptions to a generative-text model
//! for carbon-footprint estimation and reduction tips, and images to an
//! object-detection service.

pub mod api;
pub mod config;
