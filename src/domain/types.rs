use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// One result row: column name to scalar value, in the column order the
/// executor reported.
pub type Row = Map<String, Value>;

/// Ordered rows returned by a single statement.
pub type QueryResult = Vec<Row>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Output of a buffered `ask` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentResponse {
    pub answer: String,
    pub sql: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub data: Option<QueryResult>,
    pub error: Option<String>,
}

impl AgentResponse {
    pub fn conversational(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sql: None,
            data: None,
            error: None,
        }
    }

    pub fn answered(answer: impl Into<String>, sql: String, data: QueryResult) -> Self {
        Self {
            answer: answer.into(),
            sql: Some(sql),
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(answer: impl Into<String>, sql: Option<String>, error: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sql,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Frames of an incremental `ask_stream` call. Every stream ends with exactly
/// one [`StreamEvent::Complete`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Token {
        content: String,
    },
    #[serde(rename = "sql")]
    SqlEmitted {
        content: String,
    },
    Status {
        content: String,
    },
    DataReady {
        row_count: usize,
    },
    Complete {
        sql: Option<String>,
        #[schema(value_type = Option<Vec<Object>>)]
        data: Option<QueryResult>,
        error: Option<String>,
    },
    Error {
        content: String,
    },
}

impl StreamEvent {
    pub fn token(content: impl Into<String>) -> Self {
        Self::Token {
            content: content.into(),
        }
    }

    pub fn status(content: impl Into<String>) -> Self {
        Self::Status {
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::Error {
            content: content.into(),
        }
    }

    pub fn complete(sql: Option<String>, data: Option<QueryResult>, error: Option<String>) -> Self {
        Self::Complete { sql, data, error }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StreamEvent::Complete { .. })
    }
}
