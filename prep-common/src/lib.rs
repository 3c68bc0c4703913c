//! Common types and utilities shared across the prep workspace.
//!
//! This crate defines the provider configuration enum, observability helpers,
//! and shared error types used throughout the workspace. It is intentionally
//! lightweight so every crate can depend on it without pulling in heavy
//! transitive costs.
//!
//! # Overview
//!
//! - [`LlmConfig`]: provider-agnostic LLM configuration
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`PrepError`] and [`Result`]: shared error handling
use serde::{Deserialize, Serialize};

pub mod observability;

/// Configuration for an LLM provider used by the assistant.
///
/// Feature flags control which variants are compiled in.
/// See the `prep-llm` crate for concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmConfig {
    #[cfg(feature = "cohere")]
    Cohere {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        temperature: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::None
    }
}

/// Error types used across the prep system.
#[derive(thiserror::Error, Debug)]
pub enum PrepError {
    /// An LLM provider failed to complete a requested generation.
    #[error("LLM error: {0}")]
    Llm(String),

    /// An upstream data source (encyclopedia, market data) reported an error.
    #[error("Source error: {0}")]
    Source(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`PrepError`].
pub type Result<T> = std::result::Result<T, PrepError>;
