mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use dto::{ChatRequest, ErrorResponse, HealthResponse, SchemaResponse};
pub use error::ServerError;
pub use router::build_router;
pub use state::ServerState;

use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::warehouse::QueryExecutor;
use std::net::SocketAddr;

pub async fn serve<P, E>(state: ServerState<P, E>, addr: SocketAddr) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    router::serve(state, addr).await
}

