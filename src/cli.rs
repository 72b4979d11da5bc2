use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "nlsql-agent",
    version,
    about = "Ask questions about warehouse data in plain language"
)]
pub struct Cli {
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long, value_enum, default_value_t = RunMode::Ask)]
    pub mode: RunMode,
    /// Overrides `rest_server.bind`
    #[arg(long)]
    pub rest_addr: Option<SocketAddr>,
    /// Overrides `default_provider`
    #[arg(long)]
    pub provider: Option<String>,
    /// Overrides `model`
    #[arg(long)]
    pub model: Option<String>,
    #[arg()]
    pub question: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Ask,
    Stream,
    Rest,
}
