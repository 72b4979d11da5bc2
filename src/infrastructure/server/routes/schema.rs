use super::super::dto::SchemaResponse;
use super::super::state::ServerState;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::warehouse::QueryExecutor;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/api/schema",
    tag = "schema",
    responses(
        (status = 200, description = "Schema documentation embedded in the system prompt", body = SchemaResponse)
    )
)]
pub async fn schema_handler<P, E>(State(state): State<Arc<ServerState<P, E>>>) -> Json<SchemaResponse>
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    debug!("Serving /api/schema request");
    Json(SchemaResponse {
        schema: state.schema_docs().to_string(),
    })
}
