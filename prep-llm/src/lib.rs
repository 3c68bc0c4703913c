//! Provider-agnostic LLM integration for the prep workspace.
//!
//! This crate exposes a common [`traits::LlmClient`] interface with
//! interview-prep helpers (guide generation, follow-up Q&A, practice
//! questions) and a concrete Cohere chat implementation. It also provides
//! a convenience function to initialize a client from a
//! [`prep_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use prep_common::{LlmConfig, Result};
//! use prep_llm::ensure_llm_ready;
//!
//! # fn main() -> Result<()> {
//! let cfg = LlmConfig::None; // or a provider variant under appropriate features
//! let client = ensure_llm_ready(&cfg)?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
pub mod cohere;
pub mod traits;

#[cfg(feature = "cohere")]
use cohere::CohereClient;
use prep_common::{LlmConfig, PrepError};
use std::sync::Arc;
use traits::LlmClient;

/// Default model for prep-guide generation
pub const DEFAULT_COHERE_MODEL: &str = "command-r-plus";

/// Build an LLM client from configuration.
pub fn ensure_llm_ready(
    config: &LlmConfig,
) -> prep_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        #[cfg(feature = "cohere")]
        LlmConfig::Cohere {
            api_key,
            model,
            temperature,
            base_url,
        } => {
            let mut client = CohereClient::new(api_key.clone(), model.clone())?;
            if let Some(base) = base_url {
                client = client.with_base_url(base)?;
            }
            if let Some(temp) = temperature {
                client = client.with_temperature(*temp);
            }
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(PrepError::Config("No LLM configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(PrepError::Config("LLM provider not enabled".to_string())),
    }
}
