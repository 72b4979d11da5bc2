use super::super::dto::{ChatRequest, ErrorResponse};
use super::super::state::ServerState;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::warehouse::QueryExecutor;
use crate::types::{AgentResponse, ChatMessage, StreamEvent};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

type Rejection = (StatusCode, Json<ErrorResponse>);

fn question_from(
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(String, Vec<ChatMessage>), Rejection> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            error!(reason = %rejection.body_text(), "Rejecting unreadable chat request body");
            return Err(missing_message());
        }
    };
    let Some(message) = payload.message else {
        error!("Rejecting chat request without message");
        return Err(missing_message());
    };
    let question = message.trim();
    if question.is_empty() {
        error!("Rejecting chat request due to empty message");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Message cannot be empty")),
        ));
    }
    Ok((question.to_string(), payload.history))
}

fn missing_message() -> Rejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("Missing 'message' in request body")),
    )
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Question answered; failures are reported in the body", body = AgentResponse),
        (status = 400, description = "Missing or empty message", body = ErrorResponse)
    )
)]
pub async fn chat_handler<P, E>(
    State(state): State<Arc<ServerState<P, E>>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, Rejection>
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    let (question, history) = question_from(payload)?;
    info!(history = history.len(), "Received /api/chat request");

    let response = state.agent().ask(&question, &history).await;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/chat/stream",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Server-sent events, one StreamEvent JSON per frame, ending with `complete`", body = StreamEvent, content_type = "text/event-stream"),
        (status = 400, description = "Missing or empty message", body = ErrorResponse)
    )
)]
pub async fn chat_stream_handler<P, E>(
    State(state): State<Arc<ServerState<P, E>>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Rejection>
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    let (question, history) = question_from(payload)?;
    info!(history = history.len(), "Received /api/chat/stream request");

    let events = state.agent().ask_stream(question, history).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(Event::default().data(data))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
