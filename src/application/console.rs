//! Terminal front end for one question.

use crate::application::agent::Agent;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::warehouse::QueryExecutor;
use crate::types::{AgentResponse, StreamEvent};
use crate::utils::formatting::{
    DEFAULT_DISPLAY_CHARS, DEFAULT_TABLE_ROWS, format_results_as_table, truncate_for_display,
};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{self, AsyncWrite, AsyncWriteExt};
use tracing::info;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Buffered answer as pretty JSON (cut for very large results), followed by a
/// text table of the rows.
pub async fn ask<P, E>(agent: &Agent<P, E>, question: &str) -> Result<AgentResponse, ConsoleError>
where
    P: ModelProvider,
    E: QueryExecutor,
{
    let response = agent.ask(question, &[]).await;
    let mut stdout = io::stdout();
    write_response(&mut stdout, &response).await?;
    Ok(response)
}

/// Token text as it arrives, other events as bracketed status lines.
pub async fn stream<P, E>(agent: &Arc<Agent<P, E>>, question: &str) -> Result<(), ConsoleError>
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    let mut events = agent.ask_stream(question, Vec::new());
    let mut stdout = io::stdout();
    while let Some(event) = events.next().await {
        write_event(&mut stdout, &event).await?;
    }
    info!("Streamed answer finished");
    Ok(())
}

async fn write_response<W>(out: &mut W, response: &AgentResponse) -> Result<(), ConsoleError>
where
    W: AsyncWrite + Unpin,
{
    let mut text = truncate_for_display(&serde_json::to_value(response)?, DEFAULT_DISPLAY_CHARS);
    if let Some(rows) = response.data.as_deref().filter(|rows| !rows.is_empty()) {
        text.push_str("\n\n");
        text.push_str(&format_results_as_table(rows, DEFAULT_TABLE_ROWS));
    }
    text.push('\n');
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

async fn write_event<W>(out: &mut W, event: &StreamEvent) -> Result<(), ConsoleError>
where
    W: AsyncWrite + Unpin,
{
    let text = render_event(event);
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

fn render_event(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Token { content } => content.clone(),
        StreamEvent::SqlEmitted { content } => format!("\n[sql] {content}\n"),
        StreamEvent::Status { content } => format!("\n[status] {content}\n"),
        StreamEvent::DataReady { row_count } => format!("[data] {row_count} rows\n"),
        StreamEvent::Error { content } => format!("\n[error] {content}\n"),
        StreamEvent::Complete {
            data: Some(rows), ..
        } if !rows.is_empty() => {
            format!("\n\n{}\n", format_results_as_table(rows, DEFAULT_TABLE_ROWS))
        }
        StreamEvent::Complete { .. } => "\n".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn tokens_render_verbatim_and_statuses_on_their_own_line() {
        assert_eq!(render_event(&StreamEvent::token("a")), "a");
        assert_eq!(
            render_event(&StreamEvent::status("Executing query...")),
            "\n[status] Executing query...\n"
        );
    }

    #[test]
    fn completion_with_rows_prints_a_table() {
        let mut row = Map::new();
        row.insert("N".into(), json!(1));
        let text = render_event(&StreamEvent::complete(
            Some("SELECT 1 AS n".into()),
            Some(vec![row]),
            None,
        ));
        assert_eq!(text, "\n\nN\n-\n1\n");
    }

    #[tokio::test]
    async fn buffered_response_is_json_then_table() {
        let mut row = Map::new();
        row.insert("N".into(), json!(1));
        let response = AgentResponse::answered("one", "SELECT 1 AS n".into(), vec![row]);

        let mut out = Vec::new();
        write_response(&mut out, &response).await.expect("write");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.starts_with("{\n  \"answer\": \"one\""));
        assert!(text.ends_with("N\n-\n1\n"));
    }

    #[tokio::test]
    async fn oversized_response_json_is_cut_before_the_table() {
        let rows: Vec<_> = (0..400)
            .map(|i| {
                let mut row = Map::new();
                row.insert("SELLER".into(), json!(format!("seller-{i:04}")));
                row
            })
            .collect();
        let response = AgentResponse::answered("many", "SELECT seller FROM t".into(), rows);

        let mut out = Vec::new();
        write_response(&mut out, &response).await.expect("write");
        let text = String::from_utf8(out).expect("utf8");

        let (json_part, table) = text.split_once("\n... (truncated)").expect("truncation marker");
        assert_eq!(json_part.chars().count(), DEFAULT_DISPLAY_CHARS);
        assert!(table.contains("... and 380 more rows"));
    }
}
