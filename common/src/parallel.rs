//! Bounded fork-join execution.
//!
//! [`WorkerPool`] owns a dedicated rayon thread pool, so a caller can cap the
//! number of items processed at once independently of rayon's global pool.

use rayon::prelude::*;


#[derive(Debug, thiserror::Error)]
pub enum WorkerPoolError {
    #[error("worker pool needs at least one worker")]
    NoWorkers,
    #[error("failed to build worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}

/// A fixed-size pool of worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    max_workers: usize,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Result<Self, WorkerPoolError> {
        if max_workers == 0 {
            return Err(WorkerPoolError::NoWorkers);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|index| format!("exod-worker-{index}"))
            .build()?;

        Ok(Self { pool, max_workers })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Maps `f` over `items` on the pool's threads.
    ///
    /// Results come back in input order. Every item is processed even when
    /// some of them produce errors, so `R` can be a `Result` without
    /// sibling work being cut short.
    pub fn map_ordered<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        if items.is_empty() {
            return Vec::new();
        }

        self.pool.install(|| {
            items
                .par_iter()
                .with_max_len(1)
                .enumerate()
                .map(|(index, item)| f(index, item))
                .collect()
        })
    }
}
