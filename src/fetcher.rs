use crate::config::{BaseUrl, FetchConfig};
use crate::error::FetchError;
use crate::model::{FetchResult, User, UserId};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Leaf capability shared by both runners: one blocking lookup per identifier.
///
/// Implementations must not panic on bad responses; anything that is not a
/// usable record is reported as `None`.
pub trait Fetcher: Sync {
    type Output: Send;

    fn fetch(&self, id: UserId) -> FetchResult<Self::Output>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    type Output = F::Output;

    fn fetch(&self, id: UserId) -> FetchResult<Self::Output> {
        (**self).fetch(id)
    }
}

// =============================================================================
// HTTP implementation
// =============================================================================

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: BaseUrl,
}

impl HttpFetcher {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: BaseUrl, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(HttpFetcher { client, base_url })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        HttpFetcher::new(config.base_url.clone(), config.timeout)
    }

    /// Like [`Fetcher::fetch`] but keeps the reason a record is missing.
    pub fn try_fetch(&self, id: UserId) -> Result<User, FetchError> {
        let url = self.base_url.user_url(id);
        let response = self.client.get(url.clone()).send().map_err(FetchError::from)?;

        if !response.status().is_success() {
            return Err(FetchError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<User>()
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

impl Fetcher for HttpFetcher {
    type Output = User;

    fn fetch(&self, id: UserId) -> FetchResult<User> {
        match self.try_fetch(id) {
            Ok(user) => {
                debug!(%id, "fetched user");
                Some(user)
            }
            Err(err) => {
                warn!(%id, error = %err, "user unavailable");
                None
            }
        }
    }
}
