//! Model clients

mod anthropic;
mod base;
mod gemini;
mod ollama;
mod openai;

pub use anthropic::AnthropicClient;
pub use base::{HttpClientBase, SseFrame};
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;
