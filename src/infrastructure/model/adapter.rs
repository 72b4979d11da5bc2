//! Message adapters - convert between different API formats

use super::types::ModelRequest;
use crate::types::MessageRole;
use serde_json::{Value, json};

/// Adapter for converting a request into each vendor's message layout
pub struct MessageAdapter;

impl MessageAdapter {
    /// OpenAI-style: the system prompt travels as the first message.
    /// Returns: [{"role": "...", "content": "..."}]
    pub fn to_openai_format(request: &ModelRequest) -> Vec<Value> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        if !request.system_prompt.is_empty() {
            messages.push(json!({
                "role": MessageRole::System.as_str(),
                "content": request.system_prompt.clone()
            }));
        }
        messages.extend(Self::plain_turns(request));
        messages
    }

    /// Ollama uses the OpenAI layout
    pub fn to_ollama_format(request: &ModelRequest) -> Vec<Value> {
        Self::to_openai_format(request)
    }

    /// Anthropic: the system prompt is a top-level field, so only turns are
    /// listed here.
    pub fn to_anthropic_format(request: &ModelRequest) -> Vec<Value> {
        Self::plain_turns(request)
    }

    /// Gemini contents use "model" for assistant turns and `parts` arrays.
    pub fn to_gemini_format(request: &ModelRequest) -> Vec<Value> {
        request
            .turns()
            .into_iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                    MessageRole::System => return None,
                };
                Some(json!({
                    "role": role,
                    "parts": [{"text": msg.content}]
                }))
            })
            .collect()
    }

    fn plain_turns(request: &ModelRequest) -> Vec<Value> {
        request
            .turns()
            .into_iter()
            .filter(|msg| msg.role != MessageRole::System)
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                })
            })
            .collect()
    }
}
