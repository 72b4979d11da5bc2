//! Gemini client implementation

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::base::{HttpClientBase, SseFrame, decode_json};
use crate::config::ModelProviderConfig;
use crate::constants::DEFAULT_GEMINI_API_PATH;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::{ModelClient, TextStream};
use crate::infrastructure::model::types::{ModelError, ModelRequest};

/// Gemini client for Google AI
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
    api_path: String,
}

impl GeminiClient {
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
                .unwrap_or_else(|| DEFAULT_GEMINI_API_PATH.to_string()),
        }
    }

    fn build_model_url(&self, model: &str, method: &str) -> String {
        let base = self.base.endpoint.trim_end_matches('/');
        let path = self.api_path.trim_matches('/');
        format!("{base}/{path}/{model}:{method}")
    }

    fn prepare(&self, request: &ModelRequest, stream: bool) -> Result<RequestBuilder, ModelError> {
        let api_key = self.base.require_api_key()?;

        let mut payload = json!({
            "contents": MessageAdapter::to_gemini_format(request),
            "generationConfig": {
                "maxOutputTokens": self.base.max_tokens
            }
        });
        if !request.system_prompt.is_empty() {
            payload["system_instruction"] = json!({
                "parts": [{"text": request.system_prompt}]
            });
        }

        let (method, query): (&str, Vec<(&str, &str)>) = if stream {
            ("streamGenerateContent", vec![("alt", "sse"), ("key", api_key)])
        } else {
            ("generateContent", vec![("key", api_key)])
        };

        Ok(self
            .base
            .http
            .post(self.build_model_url(&request.model, method))
            .query(&query)
            .json(&payload))
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: &ModelRequest) -> Result<String, ModelError> {
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            history = request.history.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self.base.send_json(self.prepare(request, false)?).await?;
        debug!("Received response from Gemini");

        let text = response.text();
        if text.is_empty() {
            return Err(ModelError::invalid_response(&self.base.id, "missing text"));
        }
        Ok(text)
    }

    async fn chat_stream(&self, request: &ModelRequest) -> Result<TextStream, ModelError> {
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            "Opening Gemini stream"
        );
        let source = self.base.open_sse(self.prepare(request, true)?).await?;
        Ok(self.base.sse_text_stream(source, decode_frame))
    }
}

fn decode_frame(provider: &str, _event: &str, data: &str) -> Result<SseFrame, ModelError> {
    let chunk: GeminiResponse = decode_json(provider, data)?;
    let text = chunk.text();
    if text.is_empty() {
        Ok(SseFrame::Skip)
    } else {
        Ok(SseFrame::Text(text))
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

impl GeminiResponse {
    fn text(self) -> String {
        self.candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_parts_of_first_candidate() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Top "},{"text":"seller"}]}}]}"#;
        match decode_frame("gemini", "message", data) {
            Ok(SseFrame::Text(text)) => assert_eq!(text, "Top seller"),
            _ => panic!("expected text fragment"),
        }
    }

    #[test]
    fn frames_without_text_are_skipped() {
        let data = r#"{"candidates":[{"finishReason":"STOP"}]}"#;
        assert!(matches!(
            decode_frame("gemini", "message", data),
            Ok(SseFrame::Skip)
        ));
    }
}
