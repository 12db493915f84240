use crate::model::FetchResult;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Concurrent,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => f.write_str("Sequential fetch"),
            Strategy::Concurrent => f.write_str("Thread pool fetch"),
        }
    }
}

/// Outcome of one strategy run. `fetched` counts slots, present or not.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub strategy: Strategy,
    pub fetched: usize,
    pub present: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn from_results<T>(strategy: Strategy, results: &[FetchResult<T>], elapsed: Duration) -> Self {
        RunReport {
            strategy,
            fetched: results.len(),
            present: results.iter().filter(|r| r.is_some()).count(),
            elapsed,
        }
    }

    pub fn absent(&self) -> usize {
        self.fetched.saturating_sub(self.present)
    }

    /// How many times faster this run was than `baseline`.
    pub fn speedup_over(&self, baseline: &RunReport) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| baseline.elapsed.as_secs_f64() / secs)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fetched {} users in {:.2} seconds",
            self.fetched,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Runs `f` and returns its output with the wall time it took.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_report_counts_slots_not_values() {
        let results = vec![Some(1), None, Some(3), None, None];
        let report = RunReport::from_results(Strategy::Concurrent, &results, Duration::from_millis(1234));

        assert_eq!(report.fetched, 5);
        assert_eq!(report.present, 2);
        assert_eq!(report.absent(), 3);
        assert_eq!(report.to_string(), "Fetched 5 users in 1.23 seconds");
    }

    #[test]
    fn test_empty_report() {
        let report = RunReport::from_results::<u32>(Strategy::Sequential, &[], Duration::ZERO);
        assert_eq!(report.fetched, 0);
        assert_eq!(report.absent(), 0);
        assert_eq!(report.to_string(), "Fetched 0 users in 0.00 seconds");
    }

    #[test]
    fn test_speedup() {
        let slow = RunReport::from_results::<u32>(Strategy::Sequential, &[], Duration::from_secs(4));
        let fast = RunReport::from_results::<u32>(Strategy::Concurrent, &[], Duration::from_secs(1));
        let instant = RunReport::from_results::<u32>(Strategy::Concurrent, &[], Duration::ZERO);

        assert_eq!(fast.speedup_over(&slow), Some(4.0));
        assert_eq!(instant.speedup_over(&slow), None);
    }

    #[test]
    fn test_timed_measures_elapsed() {
        let (value, elapsed) = timed(|| {
            thread::sleep(Duration::from_millis(20));
            42
        });
        assert_eq!(value, 42);
        assert!(elapsed >= Duration::from_millis(20));
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(Strategy::Sequential.to_string(), "Sequential fetch");
        assert_eq!(Strategy::Concurrent.to_string(), "Thread pool fetch");
    }
}
