//! Inference layer: observation enhancement and photo analysis calls.

mod client;
mod config;
mod error;
pub mod wire;

#[cfg(feature = "http")]
mod http;

pub use client::{EnhanceRequest, InferenceClient, PhotoScanRequest};
pub use config::InferenceConfig;
pub use error::InferenceError;

#[cfg(feature = "http")]
pub use http::HttpInferenceClient;
