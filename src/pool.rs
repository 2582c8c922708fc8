//! Lifecycle of the worker threads for one run.
//!
//! [`WorkerPool::dispatch`] spawns every worker as a scoped thread, so
//! workers borrow the session's state for exactly the duration of the run
//! and never own it. Each worker:
//!
//! 1. registers at the [`StartBarrier`] and parks,
//! 2. stamps the moment it leaves the barrier,
//! 3. runs the job (the strategy bound to its iteration count),
//! 4. returns its start stamp through the join handle.
//!
//! The pool releases the barrier only after every worker has registered, and
//! joins every worker before returning. A caller that reads the clock right
//! after `dispatch` returns therefore stamps a time that follows every
//! worker's last increment.
//!
//! Failing to create a thread or to allocate the join-handle storage aborts
//! the process: the workers already started are parked at the barrier and
//! can neither be released nor joined.

use std::fmt::Display;
use std::thread;

use crate::barrier::StartBarrier;
use crate::clock::{Clock, Timestamp};
use crate::error::{Error, Result};

/// Stack size given to each worker thread: 2 MiB, the same as a thread
/// spawned by `std` without a size.
pub const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

/// What [`WorkerPool::dispatch`] hands back once every worker has joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched<T> {
    /// Value returned by the release closure, stamped just before release.
    pub released: T,
    /// When each worker left the barrier, in spawn order.
    pub started_at: Vec<Timestamp>,
}

impl<T> Dispatched<T> {
    /// The earliest moment any worker left the barrier.
    pub fn earliest_start(&self) -> Option<Timestamp> {
        self.started_at.iter().copied().min()
    }
}

/// Spawns, releases and joins a fixed number of worker threads.
///
/// # Examples
///
/// ```rust
/// use htmref::barrier::StartBarrier;
/// use htmref::clock::Clock;
/// use htmref::pool::WorkerPool;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let pool = WorkerPool::new(4);
/// let barrier = StartBarrier::new(pool.threads());
/// let total = AtomicU64::new(0);
///
/// let dispatched = pool
///     .dispatch(&barrier, || { total.fetch_add(1, Ordering::Relaxed); }, Clock::now)
///     .unwrap();
///
/// assert_eq!(total.load(Ordering::Relaxed), 4);
/// assert!(dispatched.earliest_start().unwrap() >= dispatched.released);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    threads: usize,
    stack_size: usize,
}

impl WorkerPool {
    /// Creates a pool of `threads` workers with the default stack size.
    pub const fn new(threads: usize) -> Self {
        WorkerPool {
            threads,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    /// Sets the stack size of each worker, in bytes.
    pub const fn with_stack_size(self, stack_size: usize) -> Self {
        Self { stack_size, ..self }
    }

    /// Number of workers the pool spawns.
    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Stack size of each worker, in bytes.
    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Runs `job` once on every worker, all starting together.
    ///
    /// `release` runs on the calling thread once all workers are parked, just
    /// before they are woken; its return value comes back in
    /// [`Dispatched::released`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] with the lowest panicking worker
    /// index if any worker panicked. All workers are joined first either way.
    pub fn dispatch<T, J, R>(
        &self,
        barrier: &StartBarrier,
        job: J,
        release: R,
    ) -> Result<Dispatched<T>>
    where
        J: Fn() + Sync,
        R: FnOnce() -> T,
    {
        debug_assert_eq!(barrier.parties(), self.threads);

        thread::scope(|scope| {
            let job = &job;
            let mut handles = Vec::new();
            if let Err(err) = handles.try_reserve_exact(self.threads) {
                fatal("failed to allocate worker thread state", err);
            }

            for index in 0..self.threads {
                let spawned = thread::Builder::new()
                    .name(format!("htmref-worker-{index}"))
                    .stack_size(self.stack_size)
                    .spawn_scoped(scope, move || {
                        barrier.register_ready();
                        let started_at = Clock::now();
                        job();
                        started_at
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => fatal("failed to spawn worker thread", err),
                }
            }

            barrier.wait_until_ready();
            let released = barrier.release_with(release);
            tracing::debug!(threads = self.threads, "workers released");

            let mut started_at = Vec::with_capacity(self.threads);
            let mut panicked = None;
            for (index, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(stamp) => started_at.push(stamp),
                    Err(_) => {
                        panicked.get_or_insert(index);
                    }
                }
            }
            tracing::debug!(threads = self.threads, "workers joined");

            match panicked {
                Some(index) => Err(Error::WorkerPanicked { index }),
                None => Ok(Dispatched {
                    released,
                    started_at,
                }),
            }
        })
    }
}

fn fatal(what: &str, err: impl Display) -> ! {
    tracing::error!(%err, "{what}");
    eprintln!("{what}: {err}");
    std::process::abort()
}
