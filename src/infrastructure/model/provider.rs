//! The generation provider selected at startup.

use async_trait::async_trait;
use tracing::info;

use super::factory::ProviderFactory;
use super::retry::RetryPolicy;
use super::traits::{ModelClient, ModelProvider, TextStream};
use super::types::{ModelError, ModelRequest};
use crate::config::{AppConfig, ModelProviderConfig};

/// One vendor client bound to one model. Chosen once from configuration and
/// injected into the agent; there is no runtime switching.
pub struct SelectedProvider {
    client: Box<dyn ModelClient>,
    model: String,
    retry: RetryPolicy,
}

impl SelectedProvider {
    pub fn new(client: Box<dyn ModelClient>, model: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            model: model.into(),
            retry,
        }
    }

    /// Build from a provider entry, rejecting models the entry does not list.
    pub fn from_provider_config(
        config: &ModelProviderConfig,
        model: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ModelError> {
        if !config.supports(model) {
            return Err(ModelError::model_not_found(&config.id, model));
        }
        Ok(Self::new(ProviderFactory::create(config), model, retry))
    }

    /// Select the provider named by `provider` (or the configured default)
    /// and the model named by `model` (or the configured default).
    pub fn from_app_config(
        config: &AppConfig,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self, ModelError> {
        let provider_id = provider.unwrap_or(&config.default_provider);
        let model = model.unwrap_or(&config.model);
        let entry = config
            .providers
            .iter()
            .find(|p| p.id == provider_id)
            .ok_or_else(|| ModelError::provider_not_found(provider_id))?;

        info!(provider = provider_id, model, "Selected generation provider");
        Self::from_provider_config(entry, model, config.retry.into())
    }

    pub fn provider_id(&self) -> &str {
        self.client.id()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelProvider for SelectedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<String, ModelError> {
        let request = request.with_model(self.model.clone());
        self.retry.run(|| self.client.chat(&request)).await
    }

    async fn chat_stream(&self, request: ModelRequest) -> Result<TextStream, ModelError> {
        let request = request.with_model(self.model.clone());
        self.retry.run(|| self.client.chat_stream(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelInfo;

    fn entry(models: &[&str]) -> ModelProviderConfig {
        ModelProviderConfig {
            id: "local".into(),
            provider_type: "ollama".into(),
            endpoint: "http://127.0.0.1:11434".into(),
            api_key: None,
            api_path: None,
            max_tokens: 64,
            models: models
                .iter()
                .map(|name| ModelInfo {
                    name: name.to_string(),
                    display_name: None,
                })
                .collect(),
        }
    }

    #[test]
    fn rejects_unlisted_model() {
        let result =
            SelectedProvider::from_provider_config(&entry(&["llama3"]), "mistral", RetryPolicy::none());
        assert!(matches!(result, Err(ModelError::ModelNotFound { .. })));
    }

    #[test]
    fn empty_model_list_accepts_any_model() {
        let provider =
            SelectedProvider::from_provider_config(&entry(&[]), "mistral", RetryPolicy::none())
                .expect("provider");
        assert_eq!(provider.provider_id(), "local");
        assert_eq!(provider.model(), "mistral");
    }
}
