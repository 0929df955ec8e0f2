mod common;

use common::{fast_poll, MockPlatform, API_KEY, PROJECT};
use insoapp_action::config::{ActionConfig, CiContext, Connection};
use insoapp_action::workflow::{run, Outcome};
use tokio_util::sync::CancellationToken;

fn action(base: &str, event: &str) -> ActionConfig {
    ActionConfig {
        connection: Connection { base_url: base.to_string(), project: PROJECT.into(), api_key: API_KEY.into() },
        image: "ghcr.io/org/repo:new".into(),
        app_name: None,
        delete_only: false,
        poll: fast_poll(),
        ci: CiContext { event_name: event.into(), repository: "org/repo".into(), sha: "deadbeef00001111".into(), head_ref: String::new() },
        github_output: None,
    }
}

#[tokio::test]
async fn push_without_existing_app_deploys_once() {
    let platform = MockPlatform::new().ready_after(1);
    let base = platform.spawn().await;
    let outcome = run(&action(&base, "push"), CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, Outcome::Deployed { app: "org-repo".into(), url: "https://org-repo.preview.example".into(), replaced: false });
    assert_eq!(platform.count("POST", "/insoapps"), 1);
    assert_eq!(platform.count("POST", "/delete"), 0);
    // existence check, one unavailable poll, one ready poll
    assert_eq!(platform.count("GET", "/org-repo"), 3);
}

#[tokio::test]
async fn push_with_existing_app_replaces_it_with_configured_image() {
    let platform = MockPlatform::new().with_app("org-repo", "ghcr.io/org/repo:old").gone_after(1);
    let base = platform.spawn().await;
    let outcome = run(&action(&base, "push"), CancellationToken::new()).await.unwrap();
    assert!(matches!(outcome, Outcome::Deployed { replaced: true, .. }), "{outcome:?}");
    assert_eq!(platform.count("POST", "/org-repo/delete"), 1);
    assert_eq!(platform.creates(), vec![serde_json::json!({"name":"org-repo","image":"ghcr.io/org/repo:new"})]);
    let calls = platform.calls();
    let delete_at = calls.iter().position(|c| c.path.ends_with("/delete")).unwrap();
    let create_at = calls.iter().position(|c| c.method == "POST" && c.path.ends_with("/insoapps")).unwrap();
    assert!(delete_at < create_at);
}

#[tokio::test]
async fn pull_request_targets_sha_suffixed_app() {
    let platform = MockPlatform::new();
    let base = platform.spawn().await;
    let outcome = run(&action(&base, "pull_request"), CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.app(), Some("org-repo-deadbeef"));
    assert_eq!(platform.calls()[0].path, "/api/playground/projects/proj/insoapps/org-repo-deadbeef");
}

#[tokio::test]
async fn explicit_app_name_overrides_repository() {
    let platform = MockPlatform::new();
    let base = platform.spawn().await;
    let mut cfg = action(&base, "push");
    cfg.app_name = Some("docs:site".into());
    let outcome = run(&cfg, CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.app(), Some("docs-site"));
}

#[tokio::test]
async fn unsupported_event_makes_no_calls() {
    let platform = MockPlatform::new();
    let base = platform.spawn().await;
    let outcome = run(&action(&base, "workflow_dispatch"), CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, Outcome::Skipped { event: "workflow_dispatch".into() });
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn delete_only_tears_down_without_redeploying() {
    let platform = MockPlatform::new().with_app("org-repo-deadbeef", "img");
    let base = platform.spawn().await;
    let mut cfg = action(&base, "pull_request");
    cfg.delete_only = true;
    let outcome = run(&cfg, CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, Outcome::Deleted { app: "org-repo-deadbeef".into() });
    assert!(platform.creates().is_empty());

    let outcome = run(&cfg, CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, Outcome::NothingToDelete { app: "org-repo-deadbeef".into() });
    assert_eq!(platform.count("POST", "/delete"), 1);
}

#[tokio::test]
async fn server_error_on_lookup_still_redeploys() {
    let platform = MockPlatform::new().get_status(503);
    let base = platform.spawn().await;
    let err = run(&action(&base, "push"), CancellationToken::new()).await.unwrap_err();
    // lookup reads as absent, so the deploy goes out; polling then keeps failing
    assert_eq!(platform.count("POST", "/insoapps"), 1);
    assert_eq!(platform.count("POST", "/delete"), 0);
    assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
}
