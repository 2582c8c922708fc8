//! Error type shared by the benchmark engine.
//!
//! Only configuration problems and worker panics are reported as values.
//! Failing to create a worker thread aborts the process instead (see
//! [`crate::pool`]).

use thiserror::Error;

use crate::config::{MAX_ITERATIONS, MAX_STACK_SIZE, MAX_THREADS, MIN_STACK_SIZE};

/// Errors produced while configuring or running a benchmark session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The strategy selector is not one of `tsx`, `addq`, `atomic`, `spinlock`.
    #[error("no such command: {0}")]
    UnknownStrategy(String),

    /// Thread count outside `1..=MAX_THREADS`.
    #[error("invalid thread count {0}: expected a value in 1..={max}", max = MAX_THREADS)]
    InvalidThreads(u32),

    /// Iteration count of zero, or large enough to overflow the expected total.
    #[error("invalid iteration count {0}: expected a value in 1..={max}", max = MAX_ITERATIONS)]
    InvalidIterations(u64),

    /// Worker stack size outside `MIN_STACK_SIZE..=MAX_STACK_SIZE`.
    #[error(
        "invalid stack size {0}: expected a value in {min}..={max} bytes",
        min = MIN_STACK_SIZE,
        max = MAX_STACK_SIZE
    )]
    InvalidStackSize(usize),

    /// Run count of zero.
    #[error("invalid run count {0}: expected a value greater than 0")]
    InvalidRuns(u32),

    /// A worker thread panicked while incrementing.
    #[error("worker thread {index} panicked")]
    WorkerPanicked {
        /// Index of the worker in spawn order.
        index: usize,
    },
}

/// Result type for benchmark operations.
pub type Result<T> = std::result::Result<T, Error>;
