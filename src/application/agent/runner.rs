use super::errors::AgentError;
use super::extractor::extract_sql;
use super::prompts::{build_repair_prompt, build_system_prompt};
use super::safety::is_safe_query;
use super::summarizer::ResultSummarizer;
use crate::infrastructure::model::{ModelProvider, ModelRequest};
use crate::infrastructure::schema::SchemaCatalog;
use crate::infrastructure::warehouse::QueryExecutor;
use crate::types::{AgentResponse, ChatMessage, QueryResult};
use crate::utils::formatting::preview;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

pub(super) const BLOCKED_ANSWER: &str = "I can only run SELECT queries for safety reasons.";
pub(super) const BLOCKED_ERROR: &str = "Query blocked: only SELECT statements allowed";
pub(super) const APOLOGY_ANSWER: &str = "Sorry, I encountered an error processing your question.";
const FIXED_PREFIX: &str = "(Fixed query)";
const PREVIEW_CHARS: usize = 120;

/// Orchestrates generation, validation, execution, repair and narration for
/// one question at a time. Holds no per-request state.
pub struct Agent<P: ModelProvider, E: QueryExecutor> {
    pub(super) provider: P,
    pub(super) executor: E,
    system_prompt: String,
}

/// A corrected statement that executed and was narrated.
struct Repaired {
    sql: String,
    rows: QueryResult,
    summary: String,
}

impl<P: ModelProvider, E: QueryExecutor> Agent<P, E> {
    pub fn new(provider: P, executor: E, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            executor,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn with_schema(provider: P, executor: E, domain: &str, schema: &SchemaCatalog) -> Self {
        Self::new(provider, executor, build_system_prompt(domain, schema.docs()))
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Buffered mode. Every failure is reported inside the response.
    pub async fn ask(&self, question: &str, history: &[ChatMessage]) -> AgentResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("ask", %request_id);
        async move {
            info!(question = %preview(question, PREVIEW_CHARS), "Agent question received");
            match self.run(question, history).await {
                Ok(response) => response,
                Err(err) => {
                    error!(error = %err, "Agent run failed");
                    AgentResponse::failed(APOLOGY_ANSWER, None, err.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, question: &str, history: &[ChatMessage]) -> Result<AgentResponse, AgentError> {
        let reply = self
            .provider
            .chat(self.question_request(question, history))
            .await?;
        info!(reply = %preview(&reply, PREVIEW_CHARS), "Model reply received");

        let Some(sql) = extract_sql(&reply) else {
            info!("No SQL in reply, answering conversationally");
            return Ok(AgentResponse::conversational(reply));
        };

        if !is_safe_query(&sql) {
            warn!(sql = %preview(&sql, PREVIEW_CHARS), "Blocked unsafe statement");
            return Ok(AgentResponse::failed(BLOCKED_ANSWER, Some(sql), BLOCKED_ERROR));
        }

        match self.executor.execute(&sql).await {
            Ok(rows) => {
                info!(rows = rows.len(), "Query executed");
                let answer = self.summarizer().summarize(question, &sql, &rows).await?;
                info!("Answer ready");
                Ok(AgentResponse::answered(answer, sql, rows))
            }
            Err(err) => {
                let error = err.to_string();
                warn!(%error, "Query failed, attempting one repair");
                Ok(self.repair(question, sql, error).await)
            }
        }
    }

    /// One corrected statement, executed once. Any failure here surfaces the
    /// original execution error.
    async fn repair(&self, question: &str, failed_sql: String, error: String) -> AgentResponse {
        match self.attempt_repair(question, &failed_sql, &error).await {
            Ok(Some(repaired)) => {
                info!(rows = repaired.rows.len(), "Repaired query succeeded");
                return AgentResponse::answered(
                    format!("{FIXED_PREFIX} {}", repaired.summary),
                    repaired.sql,
                    repaired.rows,
                );
            }
            Ok(None) => warn!("Repair produced no usable statement"),
            Err(err) => warn!(repair_error = %err, "Repair attempt failed"),
        }
        AgentResponse::failed(
            format!("I generated a query but it failed: {error}"),
            Some(failed_sql),
            error,
        )
    }

    async fn attempt_repair(
        &self,
        question: &str,
        failed_sql: &str,
        error: &str,
    ) -> Result<Option<Repaired>, AgentError> {
        let reply = self
            .provider
            .chat(self.repair_request(question, failed_sql, error))
            .await?;
        let Some(sql) = usable_statement(&reply) else {
            return Ok(None);
        };
        let rows = self.executor.execute(&sql).await?;
        let summary = self.summarizer().summarize(question, &sql, &rows).await?;
        Ok(Some(Repaired { sql, rows, summary }))
    }

    pub(super) fn question_request(&self, question: &str, history: &[ChatMessage]) -> ModelRequest {
        ModelRequest::new(question, self.system_prompt.as_str()).with_history(history.to_vec())
    }

    pub(super) fn repair_request(&self, question: &str, failed_sql: &str, error: &str) -> ModelRequest {
        ModelRequest::new(
            build_repair_prompt(question, failed_sql, error),
            self.system_prompt.as_str(),
        )
    }

    pub(super) fn summarizer(&self) -> ResultSummarizer<'_, P> {
        ResultSummarizer::new(&self.provider, &self.system_prompt)
    }
}

/// Extracted and safe, or nothing.
pub(super) fn usable_statement(reply: &str) -> Option<String> {
    extract_sql(reply).filter(|sql| is_safe_query(sql))
}
