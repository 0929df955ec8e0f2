use std::time::Duration;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::AppRecord;
use crate::errors::{ClientError, Operation};
use crate::poll::{poll_until, PollOutcome, PollPolicy};

const API_KEY_HEADER: &str = "api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of looking an app up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(AppRecord),
    /// The platform refused the lookup. 404 is the usual case, but any
    /// non-2xx answer lands here.
    Absent { status: StatusCode },
}

/// Client for the InsoApp resource of one playground project.
#[derive(Debug, Clone)]
pub struct AppClient {
    http: reqwest::Client,
    endpoint: Url,
    poll: PollPolicy,
    cancel: CancellationToken,
}

impl AppClient {
    pub fn new(base_url: &str, project: &str, api_key: &str) -> Result<Self, ClientError> {
        let endpoint = insoapps_endpoint(base_url, project)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key).map_err(|_| ClientError::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        debug!(endpoint=%endpoint, "client.ready");
        Ok(Self { http, endpoint, poll: PollPolicy::default(), cancel: CancellationToken::new() })
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self { self.poll = poll; self }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self { self.cancel = cancel; self }

    pub fn endpoint(&self) -> &Url { &self.endpoint }

    fn app_url(&self, name: &str, action: Option<&str>) -> Result<Url, ClientError> {
        let mut url = self.endpoint.clone();
        {
            let mut segs = url.path_segments_mut().map_err(|_| ClientError::InvalidUrl(self.endpoint.to_string()))?;
            segs.push(name);
            if let Some(a) = action { segs.push(a); }
        }
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<&AppRecord>) -> Result<Response, ClientError> {
        let mut req = self.http.request(method.clone(), url.clone());
        if let Some(app) = body { req = req.json(&app.deploy_request()); }
        let resp = req.send().await?;
        let status = resp.status();
        debug!(%method, %url, status=status.as_u16(), "http.response");
        if !status.is_success() {
            return Err(ClientError::Status { method, url: url.to_string(), status });
        }
        Ok(resp)
    }

    /// Fetches the current state of `app_name`. Any non-2xx answer is an error.
    pub async fn get(&self, app_name: &str) -> Result<AppRecord, ClientError> {
        let url = self.app_url(app_name, None)?;
        let resp = self.send(Method::GET, url.clone(), None).await?;
        let body = resp.bytes().await?;
        AppRecord::from_json(&body).map_err(|source| ClientError::Decode { url: url.to_string(), source })
    }

    /// Like [`get`](Self::get), but a rejected request becomes [`Lookup::Absent`].
    /// Transport and decoding failures still propagate.
    pub async fn lookup(&self, app_name: &str) -> Result<Lookup, ClientError> {
        match self.get(app_name).await {
            Ok(app) => Ok(Lookup::Found(app)),
            Err(ClientError::Status { status, .. }) => Ok(Lookup::Absent { status }),
            Err(e) => Err(e),
        }
    }

    /// Existence check. Treats every non-2xx answer as "not there", so a
    /// server error reads the same as a 404; that case is logged at warn.
    pub async fn exists(&self, app_name: &str) -> Result<Option<AppRecord>, ClientError> {
        match self.lookup(app_name).await? {
            Lookup::Found(app) => Ok(Some(app)),
            Lookup::Absent { status } => {
                if status.is_server_error() {
                    warn!(event="app.lookup.server_error", app=%app_name, status=status.as_u16(), "treating app as absent");
                } else {
                    debug!(event="app.lookup.absent", app=%app_name, status=status.as_u16());
                }
                Ok(None)
            }
        }
    }

    pub async fn deploy(&self, app: &AppRecord) -> Result<(), ClientError> {
        self.send(Method::POST, self.endpoint.clone(), Some(app)).await?;
        info!(event="deploy.requested", app=%app.name, image=%app.image);
        Ok(())
    }

    pub async fn delete(&self, app: &AppRecord) -> Result<(), ClientError> {
        let url = self.app_url(&app.name, Some("delete"))?;
        self.send(Method::POST, url, None).await?;
        info!(event="delete.requested", app=%app.name);
        Ok(())
    }

    /// Deploys `app` and blocks until the platform reports it ready.
    pub async fn deploy_and_wait(&self, app: &AppRecord) -> Result<AppRecord, ClientError> {
        info!(event="deploy.start", app=%app.name, image=%app.image, "deploying app");
        self.deploy(app).await?;
        let name = app.name.as_str();
        let this = self;
        let outcome = poll_until(&self.poll, &self.cancel, move || async move {
            let current = this.get(name).await?;
            debug!(event="deploy.poll", app=%name, available=current.available);
            Ok::<_, ClientError>(current.is_ready().then_some(current))
        }).await?;
        match outcome {
            PollOutcome::Ready(current) => {
                info!(event="deploy.ready", app=%current.name, url=%current.url, "successfully deployed app");
                Ok(current)
            }
            PollOutcome::TimedOut { attempts } => {
                warn!(event="deploy.timeout", app=%name, attempts);
                Err(ClientError::Timeout { app: app.name.clone(), operation: Operation::Deploy, waited: self.poll.timeout })
            }
            PollOutcome::Cancelled { attempts } => {
                warn!(event="deploy.cancelled", app=%name, attempts);
                Err(ClientError::Cancelled { app: app.name.clone(), operation: Operation::Deploy })
            }
        }
    }

    /// Deletes `app` and blocks until lookups stop finding it.
    pub async fn delete_and_wait(&self, app: &AppRecord) -> Result<(), ClientError> {
        info!(event="delete.start", app=%app.name, "deleting app");
        self.delete(app).await?;
        let name = app.name.as_str();
        let this = self;
        let outcome = poll_until(&self.poll, &self.cancel, move || async move {
            let gone = this.exists(name).await?.is_none();
            debug!(event="delete.poll", app=%name, gone);
            Ok::<_, ClientError>(gone.then_some(()))
        }).await?;
        match outcome {
            PollOutcome::Ready(()) => {
                info!(event="delete.done", app=%app.name, "successfully deleted app");
                Ok(())
            }
            PollOutcome::TimedOut { attempts } => {
                warn!(event="delete.timeout", app=%name, attempts);
                Err(ClientError::Timeout { app: app.name.clone(), operation: Operation::Delete, waited: self.poll.timeout })
            }
            PollOutcome::Cancelled { attempts } => {
                warn!(event="delete.cancelled", app=%name, attempts);
                Err(ClientError::Cancelled { app: app.name.clone(), operation: Operation::Delete })
            }
        }
    }
}

/// `{base}/api/playground/projects/{project}/insoapps`, each segment escaped.
pub fn insoapps_endpoint(base_url: &str, project: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(format!("{base_url}: not a base url")))?
        .pop_if_empty()
        .extend(["api", "playground", "projects", project, "insoapps"]);
    Ok(url)
}
