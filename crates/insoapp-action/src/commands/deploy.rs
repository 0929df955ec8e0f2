use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::AppRecord;
use crate::commands::{client, OutputFormat};
use crate::config::EffectiveConfig;
use crate::errors::CliError;

pub async fn handle(cfg: &EffectiveConfig, name: &str, image: Option<String>, output: OutputFormat, cancel: CancellationToken) -> Result<()> {
    let image = image.or_else(|| cfg.image.clone()).ok_or_else(|| CliError::config("missing input docker_image (pass --image)"))?;
    let client = client(cfg, cancel)?;
    let app = client.deploy_and_wait(&AppRecord::new(name, image)).await.map_err(CliError::from)?;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string(&app)?),
        OutputFormat::Text => println!("Go to {} to see the app.", app.url),
    }
    Ok(())
}
