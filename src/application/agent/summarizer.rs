//! Narrates a result set through a second generation call.

use super::prompts::build_summary_prompt;
use crate::infrastructure::model::{ModelError, ModelProvider, ModelRequest, TextStream};
use crate::types::Row;
use futures::stream;
use tracing::debug;

pub const NO_RESULTS_MESSAGE: &str = "The query returned no results.";

pub struct ResultSummarizer<'a, P: ModelProvider> {
    provider: &'a P,
    system_prompt: &'a str,
}

impl<'a, P: ModelProvider> ResultSummarizer<'a, P> {
    pub fn new(provider: &'a P, system_prompt: &'a str) -> Self {
        Self {
            provider,
            system_prompt,
        }
    }

    /// Empty results short-circuit without a model call.
    pub async fn summarize(
        &self,
        question: &str,
        sql: &str,
        rows: &[Row],
    ) -> Result<String, ModelError> {
        if rows.is_empty() {
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }
        debug!(rows = rows.len(), "Requesting result summary");
        self.provider.chat(self.request(question, sql, rows)).await
    }

    /// Fragments forwarded as the provider produces them.
    pub async fn summarize_stream(
        &self,
        question: &str,
        sql: &str,
        rows: &[Row],
    ) -> Result<TextStream, ModelError> {
        if rows.is_empty() {
            return Ok(Box::pin(stream::once(async {
                Ok(NO_RESULTS_MESSAGE.to_string())
            })));
        }
        debug!(rows = rows.len(), "Requesting streamed result summary");
        self.provider
            .chat_stream(self.request(question, sql, rows))
            .await
    }

    fn request(&self, question: &str, sql: &str, rows: &[Row]) -> ModelRequest {
        ModelRequest::new(build_summary_prompt(question, sql, rows), self.system_prompt)
    }
}
