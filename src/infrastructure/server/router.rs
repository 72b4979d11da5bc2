use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::warehouse::QueryExecutor;
use axum::Router;
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

pub fn build_router<P, E>(state: ServerState<P, E>) -> Router
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    let cors = cors_layer(state.cors_origins());
    let state = Arc::new(state);

    let stream_route = post(routes::chat::chat_stream_handler::<P, E>)
        .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_ACCEL_BUFFERING,
            HeaderValue::from_static("no"),
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/api/chat", post(routes::chat::chat_handler::<P, E>))
        .route("/api/chat/stream", stream_route)
        .route("/api/schema", get(routes::schema::schema_handler::<P, E>))
        .route("/health", get(routes::health::health_handler))
        .layer(cors)
        .with_state(state)
}

pub(super) async fn serve<P, E>(state: ServerState<P, E>, addr: SocketAddr) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
    E: QueryExecutor + 'static,
{
    info!(%addr, "Binding REST server");
    let app = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = origin.as_str(), "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
