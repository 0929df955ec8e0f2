use thiserror::Error;
use std::fmt;
use std::time::Duration;
use reqwest::{Method, StatusCode};

#[derive(Error, Debug)]
pub enum CliErrorKind {
    #[error("usage error: {0}")] Usage(String),
    #[error("config error: {0}")] Config(String),
    #[error("runtime error: {0}")] Runtime(String),
    #[error("io error: {0}")] Io(String),
    #[error("network error: {0}")] Network(String),
    #[error("timeout: {0}")] Timeout(String),
    #[error("cancelled: {0}")] Cancelled(String),
}

#[derive(Debug)]
pub struct CliError { pub kind: CliErrorKind, pub source: Option<anyhow::Error> }
impl fmt::Display for CliError { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.kind.fmt(f) } }
impl std::error::Error for CliError { fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { self.source.as_ref().map(|e| e.as_ref() as _) } }

impl CliErrorKind { pub fn code(&self) -> i32 { match self { Self::Usage(_) => 2, Self::Config(_) => 10, Self::Runtime(_) => 20, Self::Io(_) => 30, Self::Network(_) => 40, Self::Timeout(_) => 50, Self::Cancelled(_) => 130 } } }

impl CliError {
    pub fn new(kind: CliErrorKind) -> Self { Self { kind, source: None } }
    pub fn with_source<E: Into<anyhow::Error>>(kind: CliErrorKind, err: E) -> Self { Self { kind, source: Some(err.into()) } }
    pub fn config(msg: impl Into<String>) -> Self { Self::new(CliErrorKind::Config(msg.into())) }
}

impl From<std::io::Error> for CliError { fn from(e: std::io::Error) -> Self { Self::with_source(CliErrorKind::Io(e.to_string()), e) } }

/// Which waiting operation an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation { Deploy, Delete }

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Operation::Deploy => f.write_str("deployment"), Operation::Delete => f.write_str("deletion") }
    }
}

/// Failures raised by [`crate::client::AppClient`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP {status} from {method} {url}")]
    Status { method: Method, url: String, status: StatusCode },
    #[error("request failed")]
    Transport(#[from] reqwest::Error),
    #[error("invalid app record in response from {url}")]
    Decode { url: String, #[source] source: serde_json::Error },
    #[error("{operation} of {app} timed out after {}", fmt_wait(.waited))]
    Timeout { app: String, operation: Operation, waited: Duration },
    #[error("{operation} of {app} was cancelled")]
    Cancelled { app: String, operation: Operation },
    #[error("invalid platform url: {0}")]
    InvalidUrl(String),
    #[error("api key is not a valid header value")]
    InvalidApiKey,
}

fn fmt_wait(waited: &Duration) -> humantime::FormattedDuration { humantime::format_duration(*waited) }

impl ClientError {
    /// HTTP status of a rejected request, if that is what this error is.
    pub fn status(&self) -> Option<StatusCode> {
        match self { ClientError::Status { status, .. } => Some(*status), _ => None }
    }

    pub fn kind(&self) -> CliErrorKind {
        let msg = self.to_string();
        match self {
            ClientError::Status { .. } | ClientError::Transport(_) => CliErrorKind::Network(msg),
            ClientError::Decode { .. } => CliErrorKind::Runtime(msg),
            ClientError::Timeout { .. } => CliErrorKind::Timeout(msg),
            ClientError::Cancelled { .. } => CliErrorKind::Cancelled(msg),
            ClientError::InvalidUrl(_) | ClientError::InvalidApiKey => CliErrorKind::Config(msg),
        }
    }
}

impl From<ClientError> for CliError { fn from(e: ClientError) -> Self { Self::with_source(e.kind(), e) } }
