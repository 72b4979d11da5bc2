//! Anthropic Messages API client

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::{HttpClientBase, SseFrame, decode_json};
use crate::config::ModelProviderConfig;
use crate::constants::ANTHROPIC_VERSION;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::{ModelClient, TextStream};
use crate::infrastructure::model::types::{ModelError, ModelRequest};

#[derive(Clone)]
pub struct AnthropicClient {
    base: HttpClientBase,
    api_path: String,
}

impl AnthropicClient {
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
                .unwrap_or_else(|| "/v1/messages".to_string()),
        }
    }

    fn prepare(&self, request: &ModelRequest, stream: bool) -> Result<RequestBuilder, ModelError> {
        let api_key = self.base.require_api_key()?;
        let payload = AnthropicRequest {
            model: request.model.clone(),
            max_tokens: self.base.max_tokens,
            system: Some(request.system_prompt.clone()).filter(|s| !s.is_empty()),
            messages: MessageAdapter::to_anthropic_format(request),
            stream,
        };

        Ok(self
            .base
            .http
            .post(self.base.build_url(&self.api_path))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload))
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: &ModelRequest) -> Result<String, ModelError> {
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            history = request.history.len(),
            "Sending request to Anthropic"
        );

        let response: AnthropicResponse = self.base.send_json(self.prepare(request, false)?).await?;
        debug!("Received response from Anthropic");

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(ModelError::invalid_response(&self.base.id, "missing text content"));
        }
        Ok(text)
    }

    async fn chat_stream(&self, request: &ModelRequest) -> Result<TextStream, ModelError> {
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            "Opening Anthropic stream"
        );
        let source = self.base.open_sse(self.prepare(request, true)?).await?;
        Ok(self.base.sse_text_stream(source, decode_frame))
    }
}

fn decode_frame(provider: &str, event: &str, data: &str) -> Result<SseFrame, ModelError> {
    match event {
        "content_block_delta" => {
            let frame: DeltaFrame = decode_json(provider, data)?;
            Ok(frame.delta.text.map(SseFrame::Text).unwrap_or(SseFrame::Skip))
        }
        "message_stop" => Ok(SseFrame::Done),
        "error" => {
            let frame: ErrorFrame = decode_json(provider, data)?;
            Err(ModelError::stream(provider, frame.error.message))
        }
        _ => Ok(SseFrame::Skip),
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<serde_json::Value>,
    stream: bool,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct DeltaFrame {
    delta: Delta,
}

#[derive(Deserialize)]
struct Delta {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorFrame {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
