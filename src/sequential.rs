use crate::fetcher::Fetcher;
use crate::model::{FetchResult, UserId};
use tracing::{info, info_span};

/// Baseline strategy: one request at a time on the calling thread.
pub struct SequentialRunner<F> {
    fetcher: F,
}

impl<F: Fetcher> SequentialRunner<F> {
    pub fn new(fetcher: F) -> Self {
        SequentialRunner { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches identifiers `1..=count` in order. The result has exactly
    /// `count` entries, entry `i` belonging to identifier `i + 1`.
    pub fn run(&self, count: u32) -> Vec<FetchResult<F::Output>> {
        let _span = info_span!("run_sequential", count).entered();

        let mut results = Vec::with_capacity(count as usize);
        for id in UserId::range(count) {
            results.push(self.fetcher.fetch(id));
        }

        let present = results.iter().filter(|r| r.is_some()).count();
        info!(present, absent = results.len() - present, "sequential run complete");
        results
    }
}

pub fn run_sequential<F: Fetcher>(fetcher: F, count: u32) -> Vec<FetchResult<F::Output>> {
    SequentialRunner::new(fetcher).run(count)
}
