//! # Provider Configuration
//!
//! Configuration types for the generation providers. Exactly one entry is
//! selected at startup through `default_provider`.
//!
//! | Type | Description | API Key Required |
//! |------|-------------|-----------------|
//! | `anthropic` | Anthropic Messages API | Yes |
//! | `openai` | OpenAI-compatible APIs | Yes |
//! | `gemini` | Google Gemini API | Yes |
//! | `ollama` | Local Ollama server | No |

use serde::{Deserialize, Serialize};

/// Default output token budget per generation call.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Information about an available model from a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model identifier used in API calls
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Configuration for a generation provider.
///
/// ```toml
/// [[providers]]
/// id = "anthropic"
/// type = "anthropic"
/// endpoint = "https://api.anthropic.com"
/// api_key = "ANTHROPIC_API_KEY"
/// models = ["claude-sonnet-4-5-20250929"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelProviderConfig {
    pub id: String,
    /// Determines the wire format: "anthropic", "openai", "gemini", "ollama"
    #[serde(rename = "type")]
    pub provider_type: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    pub max_tokens: u32,
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawProviderConfig {
    pub(super) id: String,
    #[serde(rename = "type", default)]
    pub(super) provider_type: String,
    pub(super) endpoint: Option<String>,
    pub(super) api_key: Option<String>,
    #[serde(default)]
    pub(super) api_path: Option<String>,
    #[serde(default)]
    pub(super) max_tokens: Option<u32>,
    #[serde(default)]
    pub(super) models: Vec<RawModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum RawModelInfo {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        display_name: Option<String>,
    },
}

impl From<RawModelInfo> for ModelInfo {
    fn from(value: RawModelInfo) -> Self {
        match value {
            RawModelInfo::Name(name) => Self {
                name,
                display_name: None,
            },
            RawModelInfo::Detailed { name, display_name } => Self { name, display_name },
        }
    }
}

impl From<RawProviderConfig> for ModelProviderConfig {
    fn from(raw: RawProviderConfig) -> Self {
        let endpoint = raw
            .endpoint
            .map(|e| super::loader::expand(&e))
            .unwrap_or_default();

        Self {
            id: raw.id,
            provider_type: raw.provider_type,
            endpoint,
            api_key: raw.api_key,
            api_path: raw.api_path,
            max_tokens: raw.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            models: raw.models.into_iter().map(ModelInfo::from).collect(),
        }
    }
}

impl ModelProviderConfig {
    /// Ensure a model exists in this provider's model list
    pub fn ensure_model(&mut self, model: &str) {
        if self.models.iter().all(|info| info.name != model) {
            self.models.push(ModelInfo {
                name: model.to_string(),
                display_name: None,
            });
        }
    }

    /// Whether `model` may be requested from this provider. An empty list
    /// accepts any model.
    pub fn supports(&self, model: &str) -> bool {
        self.models.is_empty() || self.models.iter().any(|info| info.name == model)
    }

    pub fn is_ollama(&self) -> bool {
        self.provider_type.eq_ignore_ascii_case("ollama")
    }
}

/// Transport-level retry settings owned by the generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}
