use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::commands::{client, OutputFormat};
use crate::config::EffectiveConfig;
use crate::errors::CliError;

pub async fn handle(cfg: &EffectiveConfig, name: &str, output: OutputFormat) -> Result<()> {
    let client = client(cfg, CancellationToken::new())?;
    let app = client.get(name).await.map_err(CliError::from)?;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string(&app)?),
        OutputFormat::Text => {
            println!("name:      {}", app.name);
            println!("image:     {}", app.image);
            println!("available: {}", app.available);
            if !app.url.is_empty() { println!("url:       {}", app.url); }
        }
    }
    Ok(())
}
