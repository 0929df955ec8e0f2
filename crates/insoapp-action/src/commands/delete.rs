use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commands::{client, OutputFormat};
use crate::config::EffectiveConfig;
use crate::errors::CliError;

pub async fn handle(cfg: &EffectiveConfig, name: &str, output: OutputFormat, cancel: CancellationToken) -> Result<()> {
    let client = client(cfg, cancel)?;
    let deleted = match client.exists(name).await.map_err(CliError::from)? {
        Some(found) => { client.delete_and_wait(&found).await.map_err(CliError::from)?; true }
        None => { info!(event="delete.skipped", app=%name, "app not found"); false }
    };
    match output {
        OutputFormat::Json => println!("{}", serde_json::json!({"app": name, "deleted": deleted})),
        OutputFormat::Text if deleted => println!("Deleted app {name}."),
        OutputFormat::Text => println!("App {name} does not exist, nothing to delete."),
    }
    Ok(())
}
