use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::client::AppClient;
use crate::config::EffectiveConfig;
use crate::errors::CliError;

pub mod run;
pub mod status;
pub mod deploy;
pub mod delete;

#[derive(clap::ValueEnum, Clone, Debug)]
pub enum LogFormat { Auto, Text, Json }

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat { Text, Json }

#[derive(Parser, Debug)]
#[command(name = "insoapp-action", version, about = "Deploy and tear down preview InsoApps from CI")]
pub struct Cli {
    /// Log level: trace|debug|info|warn|error (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
    /// Log format on stderr: auto|text|json
    #[arg(long, default_value = "auto", global = true)]
    pub log_format: LogFormat,
    /// Result format on stdout
    #[arg(long, default_value = "text", global = true)]
    pub output: OutputFormat,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the CI workflow configured through INPUT_* and GITHUB_* variables (default)
    Run {},
    /// Show the current state of one app
    Status { name: String },
    /// Deploy one app and wait until it is available
    Deploy {
        name: String,
        /// Image to deploy; defaults to INPUT_DOCKER_IMAGE
        #[arg(long)] image: Option<String>,
    },
    /// Delete one app, if present, and wait until it is gone
    Delete { name: String },
}

pub(crate) fn client(cfg: &EffectiveConfig, cancel: CancellationToken) -> Result<AppClient, CliError> {
    let conn = cfg.connection()?;
    Ok(AppClient::new(&conn.base_url, &conn.project, &conn.api_key)?
        .with_poll_policy(cfg.poll)
        .with_cancellation(cancel))
}
