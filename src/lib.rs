pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod utils;

pub use application::{agent, console};
pub use cli::{Cli, RunMode};
pub use config::{AppConfig, ConfigError};
pub use domain::types;
pub use infrastructure::{model, server, warehouse};

use agent::Agent;
use infrastructure::model::{ModelError, SelectedProvider};
use infrastructure::schema::SchemaCatalog;
use infrastructure::server::{ServerError, ServerState};
use infrastructure::warehouse::SnowflakeExecutor;
use std::io::{self, IsTerminal, Read};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Console(#[from] console::ConsoleError),
    #[error("invalid REST bind address '{addr}': {source}")]
    InvalidBind {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("failed to read question from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("a question is required via arguments or stdin")]
    MissingQuestion,
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    init_tracing();
    info!("Starting nlsql-agent");
    debug!(mode = ?cli.mode, config = ?cli.config, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let config = AppConfig::load(config_path)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    } else {
        info!("Loaded configuration from default path");
    }

    let provider =
        SelectedProvider::from_app_config(&config, cli.provider.as_deref(), cli.model.as_deref())?;
    let executor = SnowflakeExecutor::from_config(config.warehouse.clone());
    let schema = SchemaCatalog::from_config(&config)?;
    let agent = Arc::new(Agent::with_schema(
        provider,
        executor,
        &config.domain,
        &schema,
    ));

    info!(mode = ?cli.mode, "Running agent in selected mode");
    match cli.mode {
        RunMode::Ask => {
            let question = load_question(&cli)?;
            console::ask(&*agent, &question).await?;
        }
        RunMode::Stream => {
            let question = load_question(&cli)?;
            console::stream(&agent, &question).await?;
        }
        RunMode::Rest => {
            let addr = rest_addr(&cli, &config)?;
            info!(%addr, "Starting REST server");
            let state = ServerState::new(
                agent,
                schema.docs().to_string(),
                config.rest_server.cors_origins.clone(),
            );
            server::serve(state, addr).await?;
        }
    }
    info!("Agent execution finished");
    Ok(())
}

pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr)
            .init();
    });
}

fn rest_addr(cli: &Cli, config: &AppConfig) -> Result<SocketAddr, AppError> {
    if let Some(addr) = cli.rest_addr {
        return Ok(addr);
    }
    let bind = &config.rest_server.bind;
    bind.parse().map_err(|source| AppError::InvalidBind {
        addr: bind.clone(),
        source,
    })
}

fn load_question(cli: &Cli) -> Result<String, AppError> {
    if !cli.question.is_empty() {
        info!("Using question provided through CLI arguments");
        return non_empty(cli.question.join(" "));
    }

    if !io::stdin().is_terminal() {
        info!("Reading question from standard input");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(AppError::Stdin)?;
        return non_empty(buffer);
    }

    warn!("Question not provided via arguments or stdin");
    Err(AppError::MissingQuestion)
}

fn non_empty(question: String) -> Result<String, AppError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingQuestion);
    }
    Ok(trimmed.to_string())
}
