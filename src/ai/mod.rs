//! Generative backend: typed requests in, validated payloads out.

pub mod gemini;
pub mod prompt;
pub mod types;

use std::sync::Arc;

use crate::config::Config;
use crate::error::GenerationError;

pub use gemini::GeminiClient;
pub use types::{GameMode, PlayStyle, SensitivityResponse, SensitivitySettings, StrategyResponse};

/// Blocking request/response generator. Called from job threads only.
pub trait Generator: Send + Sync {
    fn tactical_brief(
        &self,
        mode: GameMode,
        style: PlayStyle,
    ) -> Result<StrategyResponse, GenerationError>;

    fn sensitivity_config(&self, device_model: &str) -> Result<SensitivityResponse, GenerationError>;
}

/// Stand-in when no API key is available: every request fails fast
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

impl Generator for Unconfigured {
    fn tactical_brief(&self, _: GameMode, _: PlayStyle) -> Result<StrategyResponse, GenerationError> {
        Err(GenerationError::NotConfigured)
    }

    fn sensitivity_config(&self, _: &str) -> Result<SensitivityResponse, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

/// Pick the generator for this config
pub fn from_config(config: &Config) -> Arc<dyn Generator> {
    match GeminiClient::from_config(config) {
        Ok(client) => Arc::new(client),
        Err(GenerationError::NotConfigured) => {
            tracing::info!("no API key configured; generation disabled");
            Arc::new(Unconfigured)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to build generation client");
            Arc::new(Unconfigured)
        }
    }
}
