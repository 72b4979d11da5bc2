use crate::application::agent::Agent;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::warehouse::QueryExecutor;
use std::sync::Arc;

pub struct ServerState<P: ModelProvider, E: QueryExecutor> {
    agent: Arc<Agent<P, E>>,
    schema_docs: String,
    cors_origins: Vec<String>,
}

impl<P: ModelProvider, E: QueryExecutor> ServerState<P, E> {
    pub fn new(agent: Arc<Agent<P, E>>, schema_docs: String, cors_origins: Vec<String>) -> Self {
        Self {
            agent,
            schema_docs,
            cors_origins,
        }
    }

    pub(crate) fn agent(&self) -> Arc<Agent<P, E>> {
        Arc::clone(&self.agent)
    }

    pub(crate) fn schema_docs(&self) -> &str {
        &self.schema_docs
    }

    pub(crate) fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }
}
