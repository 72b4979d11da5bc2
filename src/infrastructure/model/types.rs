//! Model types - Request and Error types

use crate::types::{ChatMessage, MessageRole};
use reqwest::StatusCode;
use thiserror::Error;

/// A single generation call: user message, system prompt and any history the
/// caller supplied explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub model: String,
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub prompt: String,
}

impl ModelRequest {
    pub fn new(prompt: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            system_prompt: system_prompt.into(),
            history: Vec::new(),
            prompt: prompt.into(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Conversation turns without the system prompt: history first, then the
    /// current user message.
    pub fn turns(&self) -> Vec<ChatMessage> {
        let mut turns = self.history.clone();
        turns.push(ChatMessage::new(MessageRole::User, self.prompt.clone()));
        turns
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' is not configured")]
    ProviderNotFound { provider: String },
    #[error("model '{model}' is not available for provider '{provider}'")]
    ModelNotFound { provider: String, model: String },
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' rate limited the request")]
    RateLimited { provider: String },
    #[error("provider '{provider}' returned status {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("stream from provider '{provider}' failed: {reason}")]
    Stream { provider: String, reason: String },
}

impl ModelError {
    pub fn provider_not_found(provider: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            provider: provider.into(),
        }
    }

    pub fn model_not_found(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn stream(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Stream {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Map a non-success HTTP status into the matching error.
    pub fn from_status(provider: impl Into<String>, status: StatusCode, body: String) -> Self {
        let provider = provider.into();
        if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited { provider }
        } else {
            Self::Status {
                provider,
                status: status.as_u16(),
                body,
            }
        }
    }

    /// Connectivity failures can be retried immediately.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ModelError::Network { source, .. } => source.is_connect() || source.is_timeout(),
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ModelError::RateLimited { .. })
    }

    pub fn is_retryable(&self) -> bool {
        self.is_connectivity() || self.is_rate_limited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_place_history_before_prompt() {
        let request = ModelRequest::new("latest", "system").with_history(vec![
            ChatMessage::user("earlier"),
            ChatMessage::assistant("reply"),
        ]);

        let turns = request.turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, "earlier");
        assert_eq!(turns[2].role, MessageRole::User);
        assert_eq!(turns[2].content, "latest");
    }

    #[test]
    fn status_mapping_distinguishes_rate_limits() {
        let limited = ModelError::from_status("p", StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(limited.is_rate_limited());
        assert!(limited.is_retryable());

        let rejected = ModelError::from_status("p", StatusCode::BAD_REQUEST, "bad".into());
        assert!(!rejected.is_retryable());
        assert_eq!(
            rejected.to_string(),
            "provider 'p' returned status 400: bad"
        );
    }
}
