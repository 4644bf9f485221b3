//! # Command Line Interface
//!
//! `routeplane` resolves, binds and unbinds application routes against a
//! Cloud Controller style API.

pub mod output;
pub mod routes;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use crate::client::CloudControllerClient;
use crate::config::{ClientSettings, Overrides};
use crate::observability::{init_logging, LogFormat};
use output::OutputFormat;
use routes::RouteCommands;

#[derive(Parser)]
#[command(name = crate::APP_NAME)]
#[command(about = "Route resolution and reconciliation for platform applications")]
#[command(version = crate::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: RouteCommands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bearer token for API authentication
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Base URL for the platform API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format (json, yaml, or table)
    #[arg(short, long, global = true, default_value = "table")]
    pub output: OutputFormat,

    /// Log format (pretty or json)
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_format);

    let settings = ClientSettings::load(Overrides {
        api_url: cli.api_url,
        token: cli.token,
        timeout_secs: cli.timeout,
        verbose: cli.verbose,
    })
    .context("Failed to load client settings")?;

    let client =
        CloudControllerClient::new(settings).context("Failed to create platform client")?;

    routes::handle_route_command(cli.command, Arc::new(client), cli.output).await
}
