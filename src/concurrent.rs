use crate::config::{PoolBackend, PoolSize};
use crate::error::PoolError;
use crate::fetcher::Fetcher;
use crate::model::{FetchResult, UserId};
use crossbeam::queue::SegQueue;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{debug, debug_span, info, info_span, warn, Span};

// =============================================================================
// Tasks and result slots
// =============================================================================

/// A pending fetch: the identifier plus exclusive access to the slot its
/// result belongs in.
pub struct Task<'slot, T> {
    id: UserId,
    slot: &'slot mut Option<FetchResult<T>>,
}

impl<T> Task<'_, T> {
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Stores the result. Consumes the task, so its slot is written once.
    pub fn complete(self, result: FetchResult<T>) {
        *self.slot = Some(result);
    }
}

/// Pre-allocated results, slot `i` reserved for identifier `i + 1`.
/// An inner `None` is an unwritten slot.
pub struct ResultSlots<T> {
    count: u32,
    slots: Vec<Option<FetchResult<T>>>,
}

impl<T> ResultSlots<T> {
    pub fn new(count: u32) -> Self {
        ResultSlots {
            count,
            slots: (0..count).map(|_| None).collect(),
        }
    }

    /// One task per slot. The tasks hold disjoint `&mut` borrows, so no two
    /// of them can ever reach the same slot.
    pub fn tasks(&mut self) -> Vec<Task<'_, T>> {
        UserId::range(self.count)
            .zip(self.slots.iter_mut())
            .map(|(id, slot)| Task { id, slot })
            .collect()
    }

    pub fn into_results(self) -> Result<Vec<FetchResult<T>>, PoolError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(PoolError::SlotUnfilled { index }))
            .collect()
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Fetches identifiers `1..=count` over a pool of at most `pool_size`
/// workers and returns the results in identifier order.
pub struct ConcurrentRunner<F> {
    fetcher: F,
    pool_size: PoolSize,
    backend: PoolBackend,
}

impl<F: Fetcher> ConcurrentRunner<F> {
    pub fn new(fetcher: F, pool_size: PoolSize) -> Self {
        ConcurrentRunner {
            fetcher,
            pool_size,
            backend: PoolBackend::default(),
        }
    }

    pub fn with_backend(mut self, backend: PoolBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Every worker has been joined by the time this returns, on success
    /// and on error.
    pub fn run(&self, count: u32) -> Result<Vec<FetchResult<F::Output>>, PoolError> {
        let _span = info_span!(
            "run_concurrent",
            count,
            pool_size = self.pool_size.get(),
            backend = %self.backend
        )
        .entered();

        if count == 0 {
            return Ok(Vec::new());
        }

        let mut slots = ResultSlots::new(count);
        match self.backend {
            PoolBackend::Threads => self.dispatch_threads(slots.tasks())?,
            PoolBackend::Rayon => self.dispatch_rayon(slots.tasks())?,
        }

        let results = slots.into_results()?;
        let present = results.iter().filter(|r| r.is_some()).count();
        info!(present, absent = results.len() - present, "concurrent run complete");
        Ok(results)
    }

    /// Scoped OS threads draining one shared task queue. The queue is full
    /// before any worker starts, so an empty pop means the run is done.
    fn dispatch_threads(&self, tasks: Vec<Task<'_, F::Output>>) -> Result<(), PoolError> {
        let workers = self.pool_size.get().min(tasks.len());
        let queue = SegQueue::new();
        for task in tasks {
            queue.push(task);
        }

        let fetcher = &self.fetcher;
        let parent = Span::current();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            let mut spawn_error = None;

            for index in 0..workers {
                let queue = &queue;
                let parent = &parent;
                let name = format!("fetch-worker-{index}");

                let spawned = thread::Builder::new()
                    .name(name.clone())
                    .spawn_scoped(scope, move || {
                        let _span = debug_span!(parent: parent, "worker", index).entered();
                        let mut completed = 0usize;
                        while let Some(task) = queue.pop() {
                            let id = task.id();
                            let result = fetcher.fetch(id);
                            debug!(%id, present = result.is_some(), "task done");
                            task.complete(result);
                            completed += 1;
                        }
                        completed
                    });

                match spawned {
                    Ok(handle) => handles.push((name, handle)),
                    Err(err) => {
                        warn!(worker = %name, error = %err, "failed to spawn worker");
                        spawn_error = Some(err);
                        break;
                    }
                }
            }

            // Fewer workers than requested still drain the whole queue.
            if handles.is_empty() {
                if let Some(err) = spawn_error {
                    return Err(PoolError::WorkerSpawn(err));
                }
            }

            let mut failure = None;
            for (name, handle) in handles {
                match handle.join() {
                    Ok(completed) => debug!(worker = %name, completed, "worker joined"),
                    Err(_) => {
                        warn!(worker = %name, "worker panicked");
                        failure.get_or_insert(PoolError::WorkerPanicked { worker: name });
                    }
                }
            }

            failure.map_or(Ok(()), Err)
        })
    }

    /// A dedicated rayon pool with exactly `pool_size` threads.
    fn dispatch_rayon(&self, tasks: Vec<Task<'_, F::Output>>) -> Result<(), PoolError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.pool_size.get())
            .thread_name(|index| format!("fetch-rayon-{index}"))
            .build()
            .map_err(|e| PoolError::PoolBuild(e.to_string()))?;

        let fetcher = &self.fetcher;
        panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                tasks.into_par_iter().for_each(|task| {
                    let id = task.id();
                    let result = fetcher.fetch(id);
                    debug!(%id, present = result.is_some(), "task done");
                    task.complete(result);
                })
            })
        }))
        .map_err(|_| {
            warn!("rayon worker panicked");
            PoolError::WorkerPanicked {
                worker: "rayon pool".to_string(),
            }
        })
    }
}

/// Convenience wrapper over [`ConcurrentRunner`] with the default backend.
pub fn run_concurrent<F: Fetcher>(
    fetcher: F,
    count: u32,
    pool_size: PoolSize,
) -> Result<Vec<FetchResult<F::Output>>, PoolError> {
    ConcurrentRunner::new(fetcher, pool_size).run(count)
}
