use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Fetch errors (collapsed to absence at the runner boundary)
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} error for {url}")]
    Http { status: u16, url: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        if err.is_timeout() {
            return FetchError::Timeout { url };
        }

        if let Some(status) = err.status() {
            return FetchError::Http {
                status: status.as_u16(),
                url,
            };
        }

        if err.is_decode() {
            return FetchError::Parse(err.to_string());
        }

        FetchError::Network(err.to_string())
    }
}

// =============================================================================
// Pool errors (the only failures a concurrent run propagates)
// =============================================================================

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Worker '{worker}' panicked")]
    WorkerPanicked { worker: String },

    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),

    #[error("Result slot {index} was never written")]
    SlotUnfilled { index: usize },
}

// =============================================================================
// Configuration errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("Unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("Pool size must be at least 1")]
    ZeroPoolSize,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Http {
            status: 404,
            url: "http://localhost/users/3".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404 error for http://localhost/users/3");
    }

    #[test]
    fn test_pool_error_display() {
        let err = PoolError::SlotUnfilled { index: 4 };
        assert_eq!(err.to_string(), "Result slot 4 was never written");

        let err = PoolError::WorkerPanicked {
            worker: "fetch-worker-2".into(),
        };
        assert_eq!(err.to_string(), "Worker 'fetch-worker-2' panicked");
    }

    #[test]
    fn test_config_error_from_toml() {
        let err = toml::from_str::<toml::Value>("count = ").unwrap_err();
        let err = ConfigError::from(err);
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FetchError>();
        assert_send_sync::<PoolError>();
        assert_send_sync::<ConfigError>();
    }
}
