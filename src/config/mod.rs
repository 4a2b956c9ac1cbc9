//! Configuration values for one publishing run.
//!
//! Everything here is an explicit value handed to the client and pipeline at
//! construction. The environment is read once into an [`EnvConfig`] snapshot.

mod retry;

pub use retry::{MAX_ATTEMPTS, RetryConfig};

use crate::error::ConfigError;
use std::collections::HashMap;
use std::time::Duration;

/// Default REST endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default endpoint for binary asset uploads
pub const DEFAULT_UPLOADS_BASE: &str = "https://uploads.github.com";

/// Default upload worker count
pub const DEFAULT_UPLOAD_WORKERS: usize = 4;

/// Upper bound for the upload worker count
pub const MAX_UPLOAD_WORKERS: usize = 16;

/// Default per-call timeout (uploads of large installers can be slow)
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Snapshot of environment variables taken once at startup
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a non-empty variable
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }

    /// Resolve the API token: explicit value, then `GH_TOKEN`, then `GITHUB_TOKEN`
    pub fn token(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| self.get("GH_TOKEN"))
            .or_else(|| self.get("GITHUB_TOKEN"))
    }
}

/// Repository the releases belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoId {
    /// Parse `owner/repo`
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = value.trim().split('/').collect();
        match parts.as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(ConfigError::InvalidRepository {
                value: value.to_string(),
            }),
        }
    }

    /// Parse owner/repo from a git remote URL
    ///
    /// Supports:
    /// - SSH SCP-like: git@github.com:owner/repo.git
    /// - HTTPS: https://github.com/owner/repo.git
    pub fn from_remote_url(url: &str) -> Result<Self, ConfigError> {
        if url.contains('@') && url.contains(':') && !url.contains("://") {
            if let Some((_, path)) = url.split_once(':') {
                return Self::parse(path.trim_end_matches(".git"));
            }
        }

        if let Some(path_start) = url.find("github.com/") {
            let path = url[path_start + "github.com/".len()..].trim_end_matches(".git");
            let parts: Vec<&str> = path.split('/').collect();
            if parts.len() >= 2 {
                return Self::parse(&format!("{}/{}", parts[0], parts[1]));
            }
        }

        Err(ConfigError::InvalidRepository {
            value: url.to_string(),
        })
    }

    /// Resolve from an explicit value or `GITHUB_REPOSITORY`
    pub fn resolve(explicit: Option<&str>, env: &EnvConfig) -> Result<Self, ConfigError> {
        match explicit.map(str::to_string).or_else(|| env.get("GITHUB_REPOSITORY")) {
            Some(value) if value.contains("://") || value.starts_with("git@") => {
                Self::from_remote_url(&value)
            }
            Some(value) => Self::parse(&value),
            None => Err(ConfigError::MissingRepository),
        }
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Transport configuration for the release service client
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Target repository
    pub repo: RepoId,
    /// API token; `None` makes every call fail with an authentication error
    pub token: Option<String>,
    /// REST endpoint
    pub api_base: String,
    /// Binary upload endpoint
    pub uploads_base: String,
    /// User-Agent header (required by the service)
    pub user_agent: String,
    /// Transport-level timeout for one request; matches the pipeline's call timeout
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Configuration against the public endpoints
    pub fn new(repo: RepoId, token: Option<String>) -> Self {
        Self {
            repo,
            token,
            api_base: DEFAULT_API_BASE.to_string(),
            uploads_base: DEFAULT_UPLOADS_BASE.to_string(),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            request_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Use `timeout` as the transport-level limit for every request
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Whether a release is marked as a prerelease
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrereleasePolicy {
    /// Never mark as prerelease
    Never,
    /// Always mark as prerelease
    Always,
    /// Prerelease for semver tags with a pre-release part or major version 0
    #[default]
    Auto,
}

impl PrereleasePolicy {
    /// Decide the prerelease flag for a tag
    pub fn is_prerelease(self, tag: &str) -> bool {
        match self {
            PrereleasePolicy::Never => false,
            PrereleasePolicy::Always => true,
            PrereleasePolicy::Auto => {
                let raw = tag.strip_prefix('v').unwrap_or(tag);
                match semver::Version::parse(raw) {
                    Ok(version) => version.major == 0 || !version.pre.is_empty(),
                    Err(_) => false,
                }
            }
        }
    }
}

/// Behavior of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Retry settings for draft creation and publish
    pub retry: RetryConfig,
    /// Timeout applied around every service call; expiry counts as a transport error
    pub call_timeout: Duration,
    /// Concurrent upload workers (1 = strictly sequential)
    pub upload_workers: usize,
    /// Prerelease policy
    pub prerelease: PrereleasePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            upload_workers: DEFAULT_UPLOAD_WORKERS,
            prerelease: PrereleasePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables with fallback to defaults
    pub fn from_env(env: &EnvConfig) -> Self {
        let defaults = Self::default();
        let call_timeout = env
            .get("RELEASE_CALL_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.call_timeout);
        let upload_workers = env
            .get("RELEASE_UPLOAD_WORKERS")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.upload_workers);

        Self {
            retry: RetryConfig::from_env(env),
            call_timeout,
            upload_workers: upload_workers.clamp(1, MAX_UPLOAD_WORKERS),
            prerelease: defaults.prerelease,
        }
    }

    /// Override the worker count, clamped to `[1, MAX_UPLOAD_WORKERS]`
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.upload_workers = workers.clamp(1, MAX_UPLOAD_WORKERS);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()
    }
}
