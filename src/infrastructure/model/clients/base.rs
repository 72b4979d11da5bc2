//! Base HTTP client with shared logic

use crate::infrastructure::model::traits::TextStream;
use crate::infrastructure::model::types::ModelError;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use reqwest_eventsource::{Error as EventSourceError, Event, EventSource};
use serde::de::DeserializeOwned;
use tracing::debug;

/// What a single SSE message contributes to the text stream.
pub enum SseFrame {
    Text(String),
    Skip,
    Done,
}

/// Vendor-specific decoding of one SSE message: `(provider, event, data)`.
pub type SseDecoder = fn(&str, &str, &str) -> Result<SseFrame, ModelError>;

/// Base HTTP client with shared functionality
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(id: String, endpoint: String, api_key: Option<String>, max_tokens: u32) -> Self {
        Self {
            id,
            endpoint,
            api_key,
            max_tokens,
            http: Client::new(),
        }
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::missing_api_key(&self.id))
    }

    /// Send a prepared request and decode the JSON body, mapping non-success
    /// statuses to [`ModelError::from_status`].
    pub async fn send_json<Res>(&self, request: RequestBuilder) -> Result<Res, ModelError>
    where
        Res: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::from_status(&self.id, status, body));
        }

        response
            .json()
            .await
            .map_err(|e| ModelError::network(&self.id, e))
    }

    /// Open an SSE connection and wait until the server accepted it, so that
    /// opening failures surface here (and can be retried) rather than inside
    /// the returned stream.
    pub async fn open_sse(&self, request: RequestBuilder) -> Result<EventSource, ModelError> {
        let mut source = EventSource::new(request)
            .map_err(|e| ModelError::stream(&self.id, e.to_string()))?;

        let error = match source.next().await {
            Some(Ok(Event::Open)) => {
                debug!(provider = self.id.as_str(), "SSE stream opened");
                return Ok(source);
            }
            Some(Ok(Event::Message(_))) => {
                ModelError::stream(&self.id, "message received before stream opened")
            }
            Some(Err(err)) => self.classify_sse_error(err).await,
            None => ModelError::stream(&self.id, "stream closed before opening"),
        };
        source.close();
        Err(error)
    }

    /// Turn an opened SSE connection into a text fragment stream. The
    /// connection is closed when the vendor signals completion, on the first
    /// error, or when the consumer drops the stream.
    pub fn sse_text_stream(&self, mut source: EventSource, decode: SseDecoder) -> TextStream {
        let base = self.clone();
        Box::pin(async_stream::stream! {
            while let Some(event) = source.next().await {
                match event {
                    Ok(Event::Open) => continue,
                    Ok(Event::Message(message)) => {
                        match decode(&base.id, &message.event, &message.data) {
                            Ok(SseFrame::Text(text)) => yield Ok(text),
                            Ok(SseFrame::Skip) => continue,
                            Ok(SseFrame::Done) => break,
                            Err(err) => {
                                yield Err(err);
                                break;
                            }
                        }
                    }
                    Err(EventSourceError::StreamEnded) => break,
                    Err(err) => {
                        yield Err(base.classify_sse_error(err).await);
                        break;
                    }
                }
            }
            source.close();
        })
    }

    async fn classify_sse_error(&self, err: EventSourceError) -> ModelError {
        match err {
            EventSourceError::InvalidStatusCode(status, response) => {
                let body = response.text().await.unwrap_or_default();
                ModelError::from_status(&self.id, status, body)
            }
            EventSourceError::Transport(source) => ModelError::network(&self.id, source),
            other => ModelError::stream(&self.id, other.to_string()),
        }
    }
}

/// Parse an SSE data payload as JSON.
pub fn decode_json<T: DeserializeOwned>(provider: &str, data: &str) -> Result<T, ModelError> {
    serde_json::from_str(data)
        .map_err(|e| ModelError::invalid_response(provider, format!("malformed stream frame: {e}")))
}
