//! Model traits

use super::types::{ModelError, ModelRequest};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy, finite, non-restartable sequence of generated text fragments.
pub type TextStream = BoxStream<'static, Result<String, ModelError>>;

/// The generation capability the agent depends on.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a complete reply.
    async fn chat(&self, request: ModelRequest) -> Result<String, ModelError>;

    /// Generate a reply as fragments, forwarded as the vendor produces them.
    async fn chat_stream(&self, request: ModelRequest) -> Result<TextStream, ModelError>;
}

/// One vendor's transport and request/response shaping.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Get the client ID
    fn id(&self) -> &str;

    async fn chat(&self, request: &ModelRequest) -> Result<String, ModelError>;

    async fn chat_stream(&self, request: &ModelRequest) -> Result<TextStream, ModelError>;
}
