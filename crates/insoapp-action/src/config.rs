use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{CliError, CliErrorKind};
use crate::poll::PollPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.cognitedata.com";

/// Optional `config.toml`. Environment values take precedence over it.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub project: Option<String>,
    pub poll_interval: Option<String>,
    pub wait_timeout: Option<String>,
}

/// Everything the process reads from its surroundings, resolved once at startup.
#[derive(Clone)]
pub struct EffectiveConfig {
    pub base_url: String,
    pub project: Option<String>,
    pub api_key: Option<String>,
    pub image: Option<String>,
    pub app_name: Option<String>,
    pub delete_only: bool,
    pub poll: PollPolicy,
    pub event_name: Option<String>,
    pub repository: Option<String>,
    pub sha: Option<String>,
    pub head_ref: Option<String>,
    pub github_output: Option<PathBuf>,
}

impl fmt::Debug for EffectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveConfig")
            .field("base_url", &self.base_url)
            .field("project", &self.project)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("image", &self.image)
            .field("app_name", &self.app_name)
            .field("delete_only", &self.delete_only)
            .field("poll", &self.poll)
            .field("event_name", &self.event_name)
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

/// Where to reach the platform and how to authenticate.
#[derive(Clone)]
pub struct Connection {
    pub base_url: String,
    pub project: String,
    pub api_key: String,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("base_url", &self.base_url).field("project", &self.project).field("api_key", &"<redacted>").finish()
    }
}

/// CI metadata describing the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiContext {
    pub event_name: String,
    pub repository: String,
    pub sha: String,
    pub head_ref: String,
}

/// Inputs of the CI workflow, all required values present.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub connection: Connection,
    pub image: String,
    pub app_name: Option<String>,
    pub delete_only: bool,
    pub poll: PollPolicy,
    pub ci: CiContext,
    pub github_output: Option<PathBuf>,
}

impl EffectiveConfig {
    pub fn load() -> Result<Self, CliError> {
        let path = std::env::var_os("INSOAPP_CONFIG").map(PathBuf::from).unwrap_or_else(config_file_path);
        let file = load_file(&path)?;
        Self::resolve(file, |k| std::env::var(k).ok())
    }

    /// Merges a file config with an environment lookup.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let input = |k: &str| env(k).filter(|v| !v.is_empty());
        let mut poll = PollPolicy::default();
        if let Some(v) = input("INSOAPP_POLL_INTERVAL").or(file.poll_interval) { poll.interval = parse_duration("poll interval", &v)?; }
        if let Some(v) = input("INSOAPP_WAIT_TIMEOUT").or(file.wait_timeout) { poll.timeout = parse_duration("wait timeout", &v)?; }
        if poll.interval.is_zero() { return Err(CliError::config("poll interval must be greater than zero")); }
        if poll.timeout.is_zero() { return Err(CliError::config("wait timeout must be greater than zero")); }
        let cfg = Self {
            base_url: input("INPUT_CDF_BASE_URL").or(file.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            project: input("INPUT_CDF_PROJECT").or(file.project),
            api_key: input("INPUT_CDF_CREDENTIALS"),
            image: input("INPUT_DOCKER_IMAGE"),
            app_name: input("INPUT_APP_NAME"),
            delete_only: input("DELETE_PR_FUNCTION").is_some(),
            poll,
            event_name: env("GITHUB_EVENT_NAME"),
            repository: env("GITHUB_REPOSITORY"),
            sha: env("GITHUB_SHA"),
            head_ref: env("GITHUB_HEAD_REF"),
            github_output: input("GITHUB_OUTPUT").map(PathBuf::from),
        };
        debug!(config=?cfg, "config.resolved");
        Ok(cfg)
    }

    pub fn connection(&self) -> Result<Connection, CliError> {
        Ok(Connection {
            base_url: self.base_url.clone(),
            project: required(&self.project, "cdf_project")?,
            api_key: required(&self.api_key, "cdf_credentials")?,
        })
    }

    /// Validates the full set of workflow inputs. Fails before any network use.
    pub fn action(&self) -> Result<ActionConfig, CliError> {
        let connection = self.connection()?;
        let image = required(&self.image, "docker_image")?;
        let ci = CiContext {
            event_name: required_env(&self.event_name, "GITHUB_EVENT_NAME")?,
            repository: required_env(&self.repository, "GITHUB_REPOSITORY")?,
            sha: required_env(&self.sha, "GITHUB_SHA")?,
            head_ref: required_env(&self.head_ref, "GITHUB_HEAD_REF")?,
        };
        Ok(ActionConfig { connection, image, app_name: self.app_name.clone(), delete_only: self.delete_only, poll: self.poll, ci, github_output: self.github_output.clone() })
    }
}

fn required(v: &Option<String>, input: &str) -> Result<String, CliError> {
    v.clone().ok_or_else(|| CliError::config(format!("missing input {input}")))
}

// CI variables must be set but may be empty (GITHUB_HEAD_REF is empty on push).
fn required_env(v: &Option<String>, var: &str) -> Result<String, CliError> {
    v.clone().ok_or_else(|| CliError::config(format!("missing environment variable {var}")))
}

fn parse_duration(what: &str, raw: &str) -> Result<Duration, CliError> {
    humantime::parse_duration(raw).map_err(|e| CliError::with_source(CliErrorKind::Config(format!("invalid {what} {raw:?}")), e))
}

pub fn load_file(path: &Path) -> Result<FileConfig, CliError> {
    debug!(path=?path, exists=path.exists(), "config.load.attempt");
    if !path.exists() { return Ok(FileConfig::default()); }
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::with_source(CliErrorKind::Config("failed to read config".into()), e))?;
    toml::from_str(&content)
        .map_err(|e| CliError::with_source(CliErrorKind::Config("failed to parse config".into()), e))
}

pub fn config_dir() -> PathBuf { dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("insoapp") }
pub fn config_file_path() -> PathBuf { config_dir().join("config.toml") }
