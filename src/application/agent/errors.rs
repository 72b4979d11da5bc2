use crate::infrastructure::model::ModelError;
use crate::infrastructure::warehouse::QueryError;
use thiserror::Error;

/// Faults raised inside a single question's run. The public entry points
/// never return these; they are folded into the structured output.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Query(#[from] QueryError),
}
