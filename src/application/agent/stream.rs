//! Incremental delivery.
//!
//! The first generation is buffered in full so fenced SQL can be stripped
//! before anything reaches the user; the display text is then replayed one
//! character per token. Narration and repair text are forwarded as produced.

use super::errors::AgentError;
use super::extractor::{extract_sql, strip_sql_blocks};
use super::runner::{Agent, BLOCKED_ERROR, usable_statement};
use super::safety::is_safe_query;
use super::summarizer::NO_RESULTS_MESSAGE;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::warehouse::QueryExecutor;
use crate::types::{ChatMessage, StreamEvent};
use async_stream::{stream, try_stream};
use futures::stream::{BoxStream, poll_fn};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

const EXECUTING_STATUS: &str = "Executing query...";
const EXECUTING_FIXED_STATUS: &str = "Executing fixed query...";
const REPAIR_NOTICE: &str = "\n\nLet me try to fix that query...\n\n";
const SUMMARY_SEPARATOR: &str = "\n\n";

impl<P, E> Agent<P, E>
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    /// Lazy, single-use event stream ending in exactly one
    /// [`StreamEvent::Complete`], whatever fails along the way.
    pub fn ask_stream(
        self: &Arc<Self>,
        question: impl Into<String>,
        history: Vec<ChatMessage>,
    ) -> BoxStream<'static, StreamEvent> {
        let span = info_span!("ask_stream", request_id = %Uuid::new_v4());
        let events = Arc::clone(self).stream_events(question.into(), history);

        let mut events = Box::pin(stream! {
            let mut completed = false;
            for await event in events {
                match event {
                    Ok(event) => {
                        completed = event.is_complete();
                        yield event;
                        if completed {
                            break;
                        }
                    }
                    Err(err) => {
                        let message = err.to_string();
                        error!(error = %message, "Streamed run failed");
                        yield StreamEvent::error(format!("Error: {message}"));
                        yield StreamEvent::complete(None, None, Some(message));
                        completed = true;
                        break;
                    }
                }
            }
            if !completed {
                yield StreamEvent::complete(None, None, None);
            }
        });
        Box::pin(poll_fn(move |cx| span.in_scope(|| events.poll_next_unpin(cx))))
    }

    fn stream_events(
        self: Arc<Self>,
        question: String,
        history: Vec<ChatMessage>,
    ) -> impl Stream<Item = Result<StreamEvent, AgentError>> + Send + 'static {
        try_stream! {
            info!("Streamed question received");
            let reply = self.buffered_reply(&question, &history).await?;
            let sql = extract_sql(&reply);

            for ch in strip_sql_blocks(&reply).chars() {
                yield StreamEvent::token(ch.to_string());
            }

            match sql {
                None => {
                    info!("No SQL in reply, answering conversationally");
                    yield StreamEvent::complete(None, None, None);
                }
                Some(sql) if !is_safe_query(&sql) => {
                    warn!("Blocked unsafe statement");
                    yield StreamEvent::SqlEmitted { content: sql.clone() };
                    yield StreamEvent::error(BLOCKED_ERROR);
                    yield StreamEvent::complete(Some(sql), None, Some(BLOCKED_ERROR.to_string()));
                }
                Some(sql) => {
                    yield StreamEvent::SqlEmitted { content: sql.clone() };
                    yield StreamEvent::status(EXECUTING_STATUS);

                    match self.executor.execute(&sql).await {
                        Ok(rows) if rows.is_empty() => {
                            info!("Query returned no rows");
                            yield StreamEvent::DataReady { row_count: 0 };
                            yield StreamEvent::token(format!("\n\n{NO_RESULTS_MESSAGE}"));
                            yield StreamEvent::complete(Some(sql), Some(rows), None);
                        }
                        Ok(rows) => {
                            info!(rows = rows.len(), "Query executed");
                            yield StreamEvent::DataReady { row_count: rows.len() };
                            yield StreamEvent::token(SUMMARY_SEPARATOR);

                            let mut summary = self
                                .summarizer()
                                .summarize_stream(&question, &sql, &rows)
                                .await?;
                            while let Some(fragment) = summary.next().await {
                                yield StreamEvent::token(fragment?);
                            }
                            yield StreamEvent::complete(Some(sql), Some(rows), None);
                        }
                        Err(err) => {
                            let error = err.to_string();
                            warn!(%error, "Query failed, attempting one repair");
                            yield StreamEvent::error(format!("Query failed: {error}"));
                            yield StreamEvent::token(REPAIR_NOTICE);

                            let mut repaired = String::new();
                            match self.provider.chat_stream(self.repair_request(&question, &sql, &error)).await {
                                Ok(mut fragments) => {
                                    while let Some(fragment) = fragments.next().await {
                                        match fragment {
                                            Ok(text) => {
                                                repaired.push_str(&text);
                                                yield StreamEvent::token(text);
                                            }
                                            Err(err) => {
                                                warn!(repair_error = %err, "Repair generation interrupted");
                                                repaired.clear();
                                                break;
                                            }
                                        }
                                    }
                                }
                                Err(err) => {
                                    warn!(repair_error = %err, "Repair generation failed");
                                }
                            }

                            let mut fixed = false;
                            if let Some(fixed_sql) = usable_statement(&repaired) {
                                yield StreamEvent::SqlEmitted { content: fixed_sql.clone() };
                                yield StreamEvent::status(EXECUTING_FIXED_STATUS);
                                match self.executor.execute(&fixed_sql).await {
                                    Ok(rows) => {
                                        info!(rows = rows.len(), "Repaired query succeeded");
                                        yield StreamEvent::DataReady { row_count: rows.len() };
                                        yield StreamEvent::complete(Some(fixed_sql), Some(rows), None);
                                        fixed = true;
                                    }
                                    Err(err) => {
                                        warn!(repair_error = %err, "Repaired query failed");
                                    }
                                }
                            } else {
                                warn!("Repair produced no usable statement");
                            }

                            if !fixed {
                                yield StreamEvent::complete(Some(sql), None, Some(error));
                            }
                        }
                    }
                }
            }
        }
    }

    /// Phase one: the whole first reply, never forwarded fragment by fragment.
    async fn buffered_reply(
        &self,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<String, AgentError> {
        let mut fragments = self
            .provider
            .chat_stream(self.question_request(question, history))
            .await?;
        let mut reply = String::new();
        while let Some(fragment) = fragments.next().await {
            reply.push_str(&fragment?);
        }
        Ok(reply)
    }
}
