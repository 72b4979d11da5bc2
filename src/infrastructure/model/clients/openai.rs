//! OpenAI-compatible client implementation

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::{HttpClientBase, SseFrame, decode_json};
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::{ModelClient, TextStream};
use crate::infrastructure::model::types::{ModelError, ModelRequest};

/// OpenAI-compatible client (works with OpenAI, Mistral, Groq, DeepSeek, etc.)
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    api_path: String,
}

impl OpenAIClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let api_key = resolve_api_key(&config.id, config.api_key.as_deref());
        Self {
            base: HttpClientBase::new(
                config.id.clone(),
                config.endpoint.clone(),
                api_key,
                config.max_tokens,
            ),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| "/v1/chat/completions".to_string()),
        }
    }

    fn prepare(&self, request: &ModelRequest, stream: bool) -> Result<RequestBuilder, ModelError> {
        let api_key = self.base.require_api_key()?;
        let payload = OpenAIRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_openai_format(request),
            max_tokens: self.base.max_tokens,
            stream,
        };

        Ok(self
            .base
            .http
            .post(self.base.build_url(&self.api_path))
            .bearer_auth(api_key)
            .json(&payload))
    }
}

#[async_trait]
impl ModelClient for OpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: &ModelRequest) -> Result<String, ModelError> {
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            history = request.history.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = self.base.send_json(self.prepare(request, false)?).await?;
        debug!("Received response from OpenAI-compatible provider");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing content"))
    }

    async fn chat_stream(&self, request: &ModelRequest) -> Result<TextStream, ModelError> {
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            "Opening OpenAI-compatible stream"
        );
        let source = self.base.open_sse(self.prepare(request, true)?).await?;
        Ok(self.base.sse_text_stream(source, decode_frame))
    }
}

fn decode_frame(provider: &str, _event: &str, data: &str) -> Result<SseFrame, ModelError> {
    if data.trim() == "[DONE]" {
        return Ok(SseFrame::Done);
    }
    let chunk: OpenAIChunk = decode_json(provider, data)?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
        .filter(|text| !text.is_empty())
        .map(SseFrame::Text)
        .unwrap_or(SseFrame::Skip))
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIChunk {
    choices: Vec<OpenAIChunkChoice>,
}

#[derive(Deserialize)]
struct OpenAIChunkChoice {
    delta: Option<OpenAIMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_delta_content_and_done_marker() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":"SELECT"}}]}"#;
        match decode_frame("openai", "message", data) {
            Ok(SseFrame::Text(text)) => assert_eq!(text, "SELECT"),
            _ => panic!("expected text fragment"),
        }
        assert!(matches!(
            decode_frame("openai", "message", "[DONE]"),
            Ok(SseFrame::Done)
        ));
    }

    #[test]
    fn role_only_deltas_are_skipped() {
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert!(matches!(
            decode_frame("openai", "message", data),
            Ok(SseFrame::Skip)
        ));
    }
}
