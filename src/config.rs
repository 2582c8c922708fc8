//! Parameters of a benchmark session.
//!
//! # Examples
//!
//! ```rust
//! use htmref::{SessionConfig, Strategy};
//!
//! let config = SessionConfig::new(Strategy::Spinlock)
//!     .with_threads(16)
//!     .with_iterations(10_000);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.expected(), 160_000);
//! ```

use crate::error::{Error, Result};
use crate::pool::DEFAULT_STACK_SIZE;
use crate::strategies::Strategy;

/// Default number of worker threads.
pub const DEFAULT_THREADS: u32 = 10;

/// Upper bound on the number of worker threads.
pub const MAX_THREADS: u32 = 10_000;

/// Default number of increments per worker.
pub const DEFAULT_ITERATIONS: u64 = 10_000_000;

/// Upper bound on the number of increments per worker, keeping the expected
/// total of a full-size run within an `i64`.
pub const MAX_ITERATIONS: u64 = i64::MAX as u64 / MAX_THREADS as u64;

/// Smallest accepted worker stack size: 64 KiB.
pub const MIN_STACK_SIZE: usize = 64 * 1024;

/// Largest accepted worker stack size: 1 GiB.
pub const MAX_STACK_SIZE: usize = 1 << 30;

/// Default number of back-to-back runs.
pub const DEFAULT_RUNS: u32 = 1;

/// What to run: the strategy, how many threads, and how much work each does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How each increment is performed.
    pub strategy: Strategy,
    /// Number of worker threads.
    pub threads: u32,
    /// Increments performed by each worker.
    pub iterations: u64,
    /// Stack size given to each worker thread, in bytes.
    pub stack_size: usize,
}

impl SessionConfig {
    /// Creates a configuration with the default thread and iteration counts.
    pub const fn new(strategy: Strategy) -> Self {
        SessionConfig {
            strategy,
            threads: DEFAULT_THREADS,
            iterations: DEFAULT_ITERATIONS,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    /// Sets the number of worker threads.
    pub const fn with_threads(self, threads: u32) -> Self {
        Self { threads, ..self }
    }

    /// Sets the number of increments per worker.
    pub const fn with_iterations(self, iterations: u64) -> Self {
        Self { iterations, ..self }
    }

    /// Sets the worker stack size in bytes.
    pub const fn with_stack_size(self, stack_size: usize) -> Self {
        Self { stack_size, ..self }
    }

    /// Total number of increments a correct run performs.
    ///
    /// Saturates at `i64::MAX` for configurations that [`validate`](Self::validate)
    /// would reject.
    pub const fn expected(&self) -> i64 {
        expected_total(self.threads, self.iterations)
    }

    /// Checks the thread count, the iteration count and the stack size.
    ///
    /// ```rust
    /// use htmref::{Error, SessionConfig, Strategy};
    ///
    /// let config = SessionConfig::new(Strategy::Atomic).with_threads(0);
    /// assert_eq!(config.validate(), Err(Error::InvalidThreads(0)));
    /// ```
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_THREADS).contains(&self.threads) {
            return Err(Error::InvalidThreads(self.threads));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(Error::InvalidIterations(self.iterations));
        }
        if !(MIN_STACK_SIZE..=MAX_STACK_SIZE).contains(&self.stack_size) {
            return Err(Error::InvalidStackSize(self.stack_size));
        }
        Ok(())
    }
}

/// `threads × iterations`, saturating at `i64::MAX`.
pub(crate) const fn expected_total(threads: u32, iterations: u64) -> i64 {
    let iterations = if iterations > i64::MAX as u64 {
        i64::MAX
    } else {
        iterations as i64
    };
    (threads as i64).saturating_mul(iterations)
}

/// Checks a requested run count.
pub fn validate_runs(runs: u32) -> Result<u32> {
    if runs == 0 {
        Err(Error::InvalidRuns(runs))
    } else {
        Ok(runs)
    }
}
