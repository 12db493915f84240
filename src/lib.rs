//! Fetch a numbered range of user records one at a time or over a bounded
//! worker pool, keeping results in identifier order either way.

pub mod concurrent;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod report;
pub mod sequential;

pub use concurrent::{run_concurrent, ConcurrentRunner, ResultSlots, Task};
pub use config::{BaseUrl, FetchConfig, PoolBackend, PoolSize, RawConfig};
pub use error::{ConfigError, FetchError, PoolError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use model::{FetchResult, User, UserId};
pub use report::{timed, RunReport, Strategy};
pub use sequential::{run_sequential, SequentialRunner};
