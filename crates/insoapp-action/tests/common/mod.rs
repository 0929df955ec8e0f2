#![allow(dead_code)]
use axum::{extract::{Path, State}, http::{HeaderMap, StatusCode}, response::IntoResponse, routing::{get, post}, Json, Router};
use insoapp_action::PollPolicy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PROJECT: &str = "proj";
pub const API_KEY: &str = "test-key";

#[derive(Debug, Clone)]
pub struct Call { pub method: &'static str, pub path: String, pub body: Option<Value>, pub api_key: Option<String>, pub content_type: Option<String> }

#[derive(Debug, Clone)]
struct MockApp { image: String, polls_until_ready: u32, polls_without_url: u32, polls_until_gone: Option<u32> }

#[derive(Default)]
struct Inner {
    apps: HashMap<String, MockApp>,
    calls: Vec<Call>,
    ready_after: u32,
    url_after: u32,
    gone_after: u32,
    get_status: Option<u16>,
    create_status: Option<u16>,
}

/// In-process stand-in for the playground InsoApp API.
#[derive(Clone, Default)]
pub struct MockPlatform { inner: Arc<Mutex<Inner>> }

impl MockPlatform {
    pub fn new() -> Self { Self::default() }

    /// Number of status polls a new deployment reports unavailable for.
    pub fn ready_after(self, polls: u32) -> Self { self.inner.lock().unwrap().ready_after = polls; self }
    /// Number of polls a new deployment reports available but with no url yet.
    pub fn url_after(self, polls: u32) -> Self { self.inner.lock().unwrap().url_after = polls; self }
    /// Number of lookups a deleted app keeps being reported for.
    pub fn gone_after(self, polls: u32) -> Self { self.inner.lock().unwrap().gone_after = polls; self }
    pub fn get_status(self, status: u16) -> Self { self.inner.lock().unwrap().get_status = Some(status); self }
    pub fn create_status(self, status: u16) -> Self { self.inner.lock().unwrap().create_status = Some(status); self }

    /// Seeds an app that is already up.
    pub fn with_app(self, name: &str, image: &str) -> Self {
        self.inner.lock().unwrap().apps.insert(name.to_string(), MockApp { image: image.to_string(), polls_until_ready: 0, polls_without_url: 0, polls_until_gone: None });
        self
    }

    pub fn calls(&self) -> Vec<Call> { self.inner.lock().unwrap().calls.clone() }

    pub fn count(&self, method: &str, suffix: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method && c.path.ends_with(suffix)).count()
    }

    pub fn creates(&self) -> Vec<Value> {
        self.calls().into_iter().filter(|c| c.method == "POST" && c.path.ends_with("/insoapps")).filter_map(|c| c.body).collect()
    }

    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/api/playground/projects/:project/insoapps", post(create))
            .route("/api/playground/projects/:project/insoapps/:name", get(fetch))
            .route("/api/playground/projects/:project/insoapps/:name/delete", post(remove))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: Option<Value>) {
        let header = |k: &str| headers.get(k).and_then(|v| v.to_str().ok()).map(str::to_string);
        let call = Call { method, path, body, api_key: header("api-key"), content_type: header("content-type") };
        self.inner.lock().unwrap().calls.push(call);
    }
}

pub fn fast_poll() -> PollPolicy { PollPolicy { interval: Duration::from_millis(20), timeout: Duration::from_millis(300) } }

fn app_url(name: &str) -> String { format!("https://{name}.preview.example") }

async fn fetch(State(p): State<MockPlatform>, Path((project, name)): Path<(String, String)>, headers: HeaderMap) -> impl IntoResponse {
    p.record("GET", format!("/api/playground/projects/{project}/insoapps/{name}"), &headers, None);
    let mut inner = p.inner.lock().unwrap();
    if let Some(code) = inner.get_status { return (StatusCode::from_u16(code).unwrap(), Json(json!({"error": "forced"}))); }
    let Some(app) = inner.apps.get_mut(&name) else { return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))) };
    if let Some(left) = app.polls_until_gone {
        if left == 0 { inner.apps.remove(&name); return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))); }
        app.polls_until_gone = Some(left - 1);
    }
    let available = if app.polls_until_ready == 0 { true } else { app.polls_until_ready -= 1; false };
    let url = if !available { Value::Null }
        else if app.polls_without_url > 0 { app.polls_without_url -= 1; Value::Null }
        else { Value::String(app_url(&name)) };
    (StatusCode::OK, Json(json!({"name": name, "image": app.image, "available": available, "url": url})))
}

async fn create(State(p): State<MockPlatform>, Path(project): Path<String>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    p.record("POST", format!("/api/playground/projects/{project}/insoapps"), &headers, Some(body.clone()));
    let mut inner = p.inner.lock().unwrap();
    if let Some(code) = inner.create_status { return StatusCode::from_u16(code).unwrap(); }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let image = body["image"].as_str().unwrap_or_default().to_string();
    let (polls_until_ready, polls_without_url) = (inner.ready_after, inner.url_after);
    inner.apps.insert(name, MockApp { image, polls_until_ready, polls_without_url, polls_until_gone: None });
    StatusCode::CREATED
}

async fn remove(State(p): State<MockPlatform>, Path((project, name)): Path<(String, String)>, headers: HeaderMap) -> impl IntoResponse {
    p.record("POST", format!("/api/playground/projects/{project}/insoapps/{name}/delete"), &headers, None);
    let mut inner = p.inner.lock().unwrap();
    let gone_after = inner.gone_after;
    match inner.apps.get_mut(&name) {
        Some(app) => { app.polls_until_gone = Some(gone_after); StatusCode::OK }
        None => StatusCode::NOT_FOUND,
    }
}
