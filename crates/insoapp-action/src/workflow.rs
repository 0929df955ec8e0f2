//! The CI entry workflow: pick a target app from the event, replace it.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::AppRecord;
use crate::client::AppClient;
use crate::config::ActionConfig;
use crate::errors::ClientError;
use crate::naming;

/// What a workflow run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    /// The event is not one the action handles; nothing was contacted.
    Skipped { event: String },
    /// Deletion-only run that removed an existing app.
    Deleted { app: String },
    /// Deletion-only run with nothing to remove.
    NothingToDelete { app: String },
    Deployed { app: String, url: String, replaced: bool },
}

impl Outcome {
    pub fn app(&self) -> Option<&str> {
        match self {
            Outcome::Skipped { .. } => None,
            Outcome::Deleted { app } | Outcome::NothingToDelete { app } | Outcome::Deployed { app, .. } => Some(app),
        }
    }
}

pub async fn run(cfg: &ActionConfig, cancel: CancellationToken) -> Result<Outcome, ClientError> {
    info!(event="workflow.start", ci_event=%cfg.ci.event_name, head_ref=%cfg.ci.head_ref, "handling event");
    let Some(target) = naming::target_app_name(cfg.app_name.as_deref(), &cfg.ci.repository, &cfg.ci.event_name, &cfg.ci.sha) else {
        info!(event="workflow.skipped", ci_event=%cfg.ci.event_name, "event not handled, nothing to do");
        return Ok(Outcome::Skipped { event: cfg.ci.event_name.clone() });
    };
    let conn = &cfg.connection;
    let client = AppClient::new(&conn.base_url, &conn.project, &conn.api_key)?
        .with_poll_policy(cfg.poll)
        .with_cancellation(cancel);
    replace(&client, &target, &cfg.image, cfg.delete_only).await
}

/// Deletes `target` if it exists, then deploys it fresh from `image`
/// unless `delete_only` is set.
pub async fn replace(client: &AppClient, target: &str, image: &str, delete_only: bool) -> Result<Outcome, ClientError> {
    let replaced = match client.exists(target).await? {
        Some(found) => {
            info!(event="workflow.existing", app=%found.name, image=%found.image, "app already exists, will delete");
            client.delete_and_wait(&found).await?;
            true
        }
        None => false,
    };
    if delete_only {
        info!(event="workflow.delete_only", app=%target, deleted=replaced);
        let app = target.to_string();
        return Ok(if replaced { Outcome::Deleted { app } } else { Outcome::NothingToDelete { app } });
    }
    let deployed = client.deploy_and_wait(&AppRecord::new(target, image)).await?;
    Ok(Outcome::Deployed { app: deployed.name, url: deployed.url, replaced })
}
