// HTTP route tests - the axum router driven through tower's oneshot

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures::stream;
use http_body_util::BodyExt;
use nlsql_agent::agent::Agent;
use nlsql_agent::model::{ModelError, ModelProvider, ModelRequest, TextStream};
use nlsql_agent::server::{ServerState, build_router};
use nlsql_agent::types::{AgentResponse, QueryResult, StreamEvent};
use nlsql_agent::warehouse::{QueryError, QueryExecutor};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct FixedProvider {
    reply: &'static str,
}

#[async_trait]
impl ModelProvider for FixedProvider {
    async fn chat(&self, _request: ModelRequest) -> Result<String, ModelError> {
        Ok(self.reply.to_string())
    }

    async fn chat_stream(&self, _request: ModelRequest) -> Result<TextStream, ModelError> {
        let pieces: Vec<Result<String, ModelError>> = self
            .reply
            .split_inclusive(' ')
            .map(|piece| Ok(piece.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(pieces)))
    }
}

struct OneRow;

#[async_trait]
impl QueryExecutor for OneRow {
    async fn execute(&self, _sql: &str) -> Result<QueryResult, QueryError> {
        let mut row = Map::new();
        row.insert("TOTAL".into(), json!(7));
        Ok(vec![row])
    }
}

fn app(reply: &'static str) -> axum::Router {
    let agent = Arc::new(Agent::new(FixedProvider { reply }, OneRow, "system"));
    build_router(ServerState::new(
        agent,
        "### RETAIL.PUBLIC.LISTINGS\n".to_string(),
        vec!["http://localhost:5173".to_string()],
    ))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app("hi")
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn schema_route_returns_documentation() {
    let response = app("hi")
        .oneshot(Request::get("/api/schema").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(body, json!({"schema": "### RETAIL.PUBLIC.LISTINGS\n"}));
}

#[tokio::test]
async fn chat_rejects_missing_message() {
    let response = app("hi")
        .oneshot(post_json("/api/chat", json!({"question": "x"})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(body, json!({"error": "Missing 'message' in request body"}));
}

#[tokio::test]
async fn chat_rejects_blank_message() {
    let response = app("hi")
        .oneshot(post_json("/api/chat/stream", json!({"message": "   "})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(body, json!({"error": "Message cannot be empty"}));
}

#[tokio::test]
async fn chat_returns_agent_response() {
    let response = app("Which month do you mean?")
        .oneshot(post_json("/api/chat", json!({"message": "sales last month?"})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body: AgentResponse = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(body, AgentResponse::conversational("Which month do you mean?"));
}

#[tokio::test]
async fn chat_stream_sends_event_frames_ending_in_complete() {
    let response = app("```sql\nSELECT count(*) AS total FROM t\n```")
        .oneshot(post_json(
            "/api/chat/stream",
            json!({"message": "how many?", "history": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );
    assert_eq!(
        headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-cache")
    );
    assert_eq!(
        headers.get("x-accel-buffering").and_then(|v| v.to_str().ok()),
        Some("no")
    );

    let text = body_text(response).await;
    let events: Vec<StreamEvent> = text
        .split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("event json"))
        .collect();

    assert_eq!(
        events.first(),
        Some(&StreamEvent::SqlEmitted {
            content: "SELECT count(*) AS total FROM t".into()
        })
    );
    assert!(events.contains(&StreamEvent::DataReady { row_count: 1 }));
    assert_eq!(events.iter().filter(|e| e.is_complete()).count(), 1);
    assert!(matches!(
        events.last(),
        Some(StreamEvent::Complete { error: None, data: Some(rows), .. }) if rows.len() == 1
    ));
}

#[tokio::test]
async fn chat_rejects_unreadable_body_with_json_error() {
    let bodies = [
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .expect("request"),
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .body(Body::empty())
            .expect("request"),
        post_json("/api/chat/stream", json!(42)),
    ];

    for request in bodies {
        let response = app("hi").oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(body, json!({"error": "Missing 'message' in request body"}));
    }
}

#[tokio::test]
async fn conversational_stream_disables_proxy_buffering() {
    let response = app("Which region?")
        .oneshot(post_json("/api/chat/stream", json!({"message": "sales?"})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-accel-buffering")
            .and_then(|v| v.to_str().ok()),
        Some("no")
    );
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("no-cache")
    );

    let text = body_text(response).await;
    let completes = text
        .split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(|data| serde_json::from_str::<StreamEvent>(data).expect("event json"))
        .filter(StreamEvent::is_complete)
        .count();
    assert_eq!(completes, 1);
}
