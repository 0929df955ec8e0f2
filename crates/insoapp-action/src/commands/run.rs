use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commands::OutputFormat;
use crate::config::EffectiveConfig;
use crate::errors::CliError;
use crate::workflow::{self, Outcome};

pub async fn handle(cfg: &EffectiveConfig, output: OutputFormat, cancel: CancellationToken) -> Result<()> {
    let action = cfg.action()?;
    let outcome = workflow::run(&action, cancel).await.map_err(CliError::from)?;
    report(&outcome, output)?;
    if let Some(path) = &action.github_output {
        write_step_outputs(path, &outcome).map_err(CliError::from)?;
    }
    Ok(())
}

fn report(outcome: &Outcome, output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string(outcome)?);
        return Ok(());
    }
    match outcome {
        Outcome::Skipped { .. } => {}
        Outcome::Deleted { app } => println!("Deleted app {app}."),
        Outcome::NothingToDelete { app } => println!("App {app} does not exist, nothing to delete."),
        Outcome::Deployed { url, .. } => println!("Go to {url} to see the app."),
    }
    Ok(())
}

/// Appends `key=value` lines to the GitHub Actions step output file.
pub fn write_step_outputs(path: &Path, outcome: &Outcome) -> std::io::Result<()> {
    let Some(app) = outcome.app() else { return Ok(()) };
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "app_name={app}")?;
    if let Outcome::Deployed { url, .. } = outcome { writeln!(f, "url={url}")?; }
    info!(event="run.step_outputs", path=%path.display());
    Ok(())
}
