use crate::error::ConfigError;
use crate::model::UserId;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_COUNT: u32 = 10;
pub const DEFAULT_POOL_SIZE: usize = 10;

// =============================================================================
// Validated newtypes
// =============================================================================

/// Base URL of the user endpoint. Request URLs are built by appending the
/// identifier as one more path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(value).map_err(|err| invalid(&err.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base"));
        }
        if url.query().is_some() {
            return Err(invalid("query strings are not allowed"));
        }
        if url.fragment().is_some() {
            return Err(invalid("fragments are not allowed"));
        }

        Ok(BaseUrl(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `<base-url>/<id>`, with at most one slash before the id.
    pub fn user_url(&self, id: UserId) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Upper bound on simultaneously executing workers. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSize(NonZeroUsize);

impl PoolSize {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(size)
            .map(PoolSize)
            .ok_or(ConfigError::ZeroPoolSize)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PoolSize {
    fn default() -> Self {
        PoolSize(NonZeroUsize::MIN.saturating_add(DEFAULT_POOL_SIZE - 1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PoolBackend {
    /// Scoped OS threads draining a shared task queue.
    #[default]
    Threads,
    /// A dedicated rayon thread pool.
    Rayon,
}

impl fmt::Display for PoolBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolBackend::Threads => f.write_str("threads"),
            PoolBackend::Rayon => f.write_str("rayon"),
        }
    }
}

// =============================================================================
// Raw (file / command line) and validated configuration
// =============================================================================

/// Unvalidated configuration; every field falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub base_url: Option<String>,
    pub count: Option<u32>,
    pub pool_size: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub backend: Option<PoolBackend>,
}

impl RawConfig {
    /// Fields set in `overrides` win.
    pub fn merge(self, overrides: RawConfig) -> RawConfig {
        RawConfig {
            base_url: overrides.base_url.or(self.base_url),
            count: overrides.count.or(self.count),
            pool_size: overrides.pool_size.or(self.pool_size),
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
            backend: overrides.backend.or(self.backend),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub base_url: BaseUrl,
    pub count: u32,
    pub pool_size: PoolSize,
    /// Per-request timeout. `None` waits for as long as the server takes.
    pub timeout: Option<Duration>,
    pub backend: PoolBackend,
}

impl TryFrom<RawConfig> for FetchConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let base_url = match raw.base_url {
            Some(value) => BaseUrl::parse(&value)?,
            None => BaseUrl::parse(DEFAULT_BASE_URL)?,
        };
        let pool_size = match raw.pool_size {
            Some(size) => PoolSize::new(size)?,
            None => PoolSize::default(),
        };

        Ok(FetchConfig {
            base_url,
            count: raw.count.unwrap_or(DEFAULT_COUNT),
            pool_size,
            timeout: raw.timeout_ms.map(Duration::from_millis),
            backend: raw.backend.unwrap_or_default(),
        })
    }
}

impl FetchConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        FetchConfig::try_from(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        FetchConfig::try_from(RawConfig::load(path)?)
    }
}

impl RawConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}
