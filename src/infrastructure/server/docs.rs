use super::dto::{ChatRequest, ErrorResponse, HealthResponse, SchemaResponse};
use super::routes;
use crate::types::{AgentResponse, ChatMessage, MessageRole, StreamEvent};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::chat::chat_handler,
        routes::chat::chat_stream_handler,
        routes::schema::schema_handler,
        routes::health::health_handler
    ),
    components(
        schemas(
            ChatRequest,
            ChatMessage,
            MessageRole,
            AgentResponse,
            StreamEvent,
            ErrorResponse,
            SchemaResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "chat", description = "Ask questions about warehouse data"),
        (name = "schema", description = "Schema documentation given to the model"),
        (name = "health", description = "Liveness probe")
    )
)]
pub(super) struct ApiDoc;
