//! Provider factory - creates clients from config

use super::clients::{AnthropicClient, GeminiClient, OllamaClient, OpenAIClient};
use super::traits::ModelClient;
use crate::config::ModelProviderConfig;
use std::env;
use tracing::warn;

/// Resolve API key from the environment variable named in config
pub fn resolve_api_key(provider: &str, env_var: Option<&str>) -> Option<String> {
    let raw = env_var.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = raw,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a model client based on provider type.
    ///
    /// Supported types:
    /// - `anthropic`, `claude` → Anthropic Messages format
    /// - `ollama`, `localai` → Ollama format
    /// - `gemini`, `google` → Gemini format
    /// - Others → OpenAI-compatible format (default)
    pub fn create(config: &ModelProviderConfig) -> Box<dyn ModelClient> {
        match config.provider_type.to_lowercase().as_str() {
            "anthropic" | "claude" => Box::new(AnthropicClient::from_config(config)),
            "ollama" | "localai" => Box::new(OllamaClient::from_config(config)),
            "gemini" | "google" | "google-ai" => Box::new(GeminiClient::from_config(config)),
            _ => Box::new(OpenAIClient::from_config(config)),
        }
    }
}
