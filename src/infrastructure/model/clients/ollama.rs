//! Ollama client implementation

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::{HttpClientBase, SseFrame};
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::{ModelClient, TextStream};
use crate::infrastructure::model::types::{ModelError, ModelRequest};

/// Ollama client for local LLM
#[derive(Clone)]
pub struct OllamaClient {
    base: HttpClientBase,
}

impl OllamaClient {
    /// Creates client from provider config.
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        Self {
            base: HttpClientBase::new(
                config.id.clone(),
                config.endpoint.clone(),
                None,
                config.max_tokens,
            ),
        }
    }

    fn payload(&self, request: &ModelRequest, stream: bool) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_ollama_format(request),
            stream,
            options: OllamaOptions {
                num_predict: self.base.max_tokens,
            },
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let url = self.base.build_url("/api/chat");

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            history = request.history.len(),
            "Sending request to Ollama"
        );

        let builder = self.base.http.post(&url).json(&self.payload(request, false));
        let response: OllamaChunk = self.base.send_json(builder).await?;
        debug!("Received response from Ollama");

        response
            .message
            .map(|m| m.content)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message"))
    }

    /// Ollama streams newline-delimited JSON objects rather than SSE.
    async fn chat_stream(&self, request: &ModelRequest) -> Result<TextStream, ModelError> {
        let url = self.base.build_url("/api/chat");
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            "Opening Ollama stream"
        );

        let response = self
            .base
            .http
            .post(&url)
            .json(&self.payload(request, true))
            .send()
            .await
            .map_err(|e| ModelError::network(&self.base.id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::from_status(&self.base.id, status, body));
        }

        let id = self.base.id.clone();
        let mut bytes = Box::pin(response.bytes_stream());
        Ok(Box::pin(async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            loop {
                let chunk = match bytes.next().await {
                    Some(Ok(chunk)) => chunk,
                    Some(Err(err)) => {
                        yield Err(ModelError::network(&id, err));
                        return;
                    }
                    None => break,
                };
                buffer.extend_from_slice(&chunk);
                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    match decode_line(&id, &line) {
                        Ok(SseFrame::Text(text)) => yield Ok(text),
                        Ok(SseFrame::Skip) => {}
                        Ok(SseFrame::Done) => return,
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }
            }
            match decode_line(&id, &buffer) {
                Ok(SseFrame::Text(text)) => yield Ok(text),
                Ok(_) => {}
                Err(err) => yield Err(err),
            }
        }))
    }
}

fn decode_line(provider: &str, line: &[u8]) -> Result<SseFrame, ModelError> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(SseFrame::Skip);
    }
    let chunk: OllamaChunk = serde_json::from_str(line)
        .map_err(|e| ModelError::invalid_response(provider, format!("malformed stream line: {e}")))?;
    if let Some(error) = chunk.error {
        return Err(ModelError::stream(provider, error));
    }
    let text = chunk.message.map(|m| m.content).unwrap_or_default();
    if !text.is_empty() {
        Ok(SseFrame::Text(text))
    } else if chunk.done {
        Ok(SseFrame::Done)
    } else {
        Ok(SseFrame::Skip)
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChunk {
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}
