//! One benchmark run, from zeroed counter to final value.
//!
//! A [`Session`] owns the [`CounterCell`] and the [`StartBarrier`] for a single
//! run. [`Session::run`] drives the sequence:
//!
//! ```text
//!   spawn workers ─► all parked ─► begin_at ─► release ─► increment ... ─► join all ─► end_at
//! ```
//!
//! Workers only ever borrow the session, and only while `run` is executing.
//! Sessions are single-use: construct a new one for every run, as
//! [`run_repeated`] does.

use crate::barrier::StartBarrier;
use crate::cell::CounterCell;
use crate::clock::{Clock, Timestamp};
use crate::config::{validate_runs, SessionConfig};
use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use crate::report::Report;
use crate::strategies::Strategy;

/// State of a single benchmark run.
///
/// # Examples
///
/// ```rust
/// use htmref::{Session, SessionConfig, Strategy};
///
/// let config = SessionConfig::new(Strategy::Atomic)
///     .with_threads(4)
///     .with_iterations(100_000);
///
/// let outcome = Session::new(config).unwrap().run().unwrap();
/// assert_eq!(outcome.actual, 400_000);
/// assert_eq!(outcome.report().expected, 400_000);
/// ```
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    cell: CounterCell,
    barrier: StartBarrier,
    begin_at: Option<Timestamp>,
    end_at: Option<Timestamp>,
}

/// The final state of a completed [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Strategy the workers used.
    pub strategy: Strategy,
    /// Number of workers.
    pub threads: u32,
    /// Increments attempted by each worker.
    pub iterations: u64,
    /// Taken after every worker parked and before any was released.
    pub begin_at: Timestamp,
    /// Taken after every worker was joined.
    pub end_at: Timestamp,
    /// Earliest moment any worker left the start barrier.
    pub first_start_at: Timestamp,
    /// Counter value read after the join.
    pub actual: i64,
}

impl Outcome {
    /// Derives the throughput statistics for this run.
    pub fn report(&self) -> Report {
        Report::from_outcome(self)
    }
}

impl Session {
    /// Validates `config` and prepares a zeroed session.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Session {
            config,
            cell: CounterCell::new(),
            barrier: StartBarrier::new(config.threads as usize),
            begin_at: None,
            end_at: None,
        })
    }

    /// The configuration this session runs with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current counter value.
    pub fn counter_value(&self) -> i64 {
        self.cell.value()
    }

    /// When the workers were released, once the run has started.
    pub fn begin_at(&self) -> Option<Timestamp> {
        self.begin_at
    }

    /// When the last worker was joined, once the run has finished.
    pub fn end_at(&self) -> Option<Timestamp> {
        self.end_at
    }

    /// Runs the benchmark to completion.
    ///
    /// # Panics
    ///
    /// Panics if the session has already been run.
    pub fn run(&mut self) -> Result<Outcome> {
        assert!(self.begin_at.is_none(), "a session runs only once");

        let SessionConfig {
            strategy,
            threads,
            iterations,
            stack_size,
        } = self.config;
        tracing::info!(%strategy, threads, iterations, "starting run");

        let pool = WorkerPool::new(threads as usize).with_stack_size(stack_size);
        let cell = &self.cell;
        let dispatched = pool.dispatch(
            &self.barrier,
            || strategy.run(cell, iterations),
            Clock::now,
        )?;
        let end_at = Clock::now();

        let begin_at = dispatched.released;
        self.begin_at = Some(begin_at);
        self.end_at = Some(end_at);

        let outcome = Outcome {
            strategy,
            threads,
            iterations,
            begin_at,
            end_at,
            first_start_at: dispatched.earliest_start().unwrap_or(begin_at),
            actual: self.cell.value(),
        };
        tracing::info!(
            %strategy,
            actual = outcome.actual,
            elapsed_us = end_at.saturating_elapsed_since(begin_at).micros(),
            "run finished"
        );
        Ok(outcome)
    }
}

/// Runs `runs` fresh sessions back to back, handing each outcome to `sink`
/// together with its zero-based run index.
///
/// Stops at the first failing run or the first error returned by `sink`.
///
/// ```rust
/// use htmref::{session::run_repeated, SessionConfig, Strategy};
///
/// let config = SessionConfig::new(Strategy::Spinlock)
///     .with_threads(2)
///     .with_iterations(1_000);
///
/// let mut totals = Vec::new();
/// run_repeated(config, 3, |_, outcome| {
///     totals.push(outcome.actual);
///     Ok::<_, htmref::Error>(())
/// })?;
/// assert_eq!(totals, vec![2_000; 3]);
/// # Ok::<(), htmref::Error>(())
/// ```
pub fn run_repeated<E>(
    config: SessionConfig,
    runs: u32,
    mut sink: impl FnMut(u32, &Outcome) -> std::result::Result<(), E>,
) -> std::result::Result<(), E>
where
    E: From<Error>,
{
    let runs = validate_runs(runs)?;
    config.validate()?;
    for run in 0..runs {
        tracing::debug!(run, runs, "new session");
        let outcome = Session::new(config)?.run()?;
        sink(run, &outcome)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(strategy: Strategy, threads: u32, iterations: u64) -> SessionConfig {
        SessionConfig::new(strategy)
            .with_threads(threads)
            .with_iterations(iterations)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert_eq!(
            Session::new(config(Strategy::Atomic, 0, 10)).unwrap_err(),
            Error::InvalidThreads(0)
        );
        assert_eq!(
            Session::new(config(Strategy::Atomic, 10_001, 10)).unwrap_err(),
            Error::InvalidThreads(10_001)
        );
        assert_eq!(
            Session::new(config(Strategy::Atomic, 1, 0)).unwrap_err(),
            Error::InvalidIterations(0)
        );
    }

    #[test]
    fn test_fresh_session_state() {
        let session = Session::new(config(Strategy::Atomic, 2, 10)).unwrap();
        assert_eq!(session.counter_value(), 0);
        assert_eq!(session.begin_at(), None);
        assert_eq!(session.end_at(), None);
        assert_eq!(session.config().threads, 2);
    }

    #[test]
    fn test_exact_strategies_reach_expected_total() {
        for strategy in [Strategy::Atomic, Strategy::Spinlock, Strategy::Transactional] {
            for (threads, iterations) in [(1, 1), (1, 10_000), (3, 7_777), (8, 20_000)] {
                let outcome = Session::new(config(strategy, threads, iterations))
                    .unwrap()
                    .run()
                    .unwrap();
                assert_eq!(
                    outcome.actual,
                    threads as i64 * iterations as i64,
                    "{strategy} {threads}x{iterations}"
                );
            }
        }
    }

    #[test]
    fn test_atomic_scenario() {
        let outcome = Session::new(config(Strategy::Atomic, 4, 100_000))
            .unwrap()
            .run()
            .unwrap();
        let report = outcome.report();
        assert_eq!(report.expected, 400_000);
        assert_eq!(report.actual, 400_000);
    }

    #[test]
    fn test_spinlock_scenario() {
        let outcome = Session::new(config(Strategy::Spinlock, 16, 10_000))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(outcome.report().expected, 160_000);
        assert_eq!(outcome.actual, 160_000);
    }

    #[test]
    fn test_unsynchronized_single_thread_is_exact() {
        let outcome = Session::new(config(Strategy::Unsynchronized, 1, 100_000))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(outcome.actual, 100_000);
    }

    #[test]
    fn test_unsynchronized_never_overcounts() {
        let outcome = Session::new(config(Strategy::Unsynchronized, 4, 100_000))
            .unwrap()
            .run()
            .unwrap();
        assert!(outcome.actual <= 400_000);
        assert!(outcome.actual > 0);
    }

    #[test]
    fn test_unsynchronized_loses_updates_under_contention() {
        let parallel = std::thread::available_parallelism().map_or(1, |n| n.get());
        if parallel < 2 {
            // A lost update needs two cores racing on the same line.
            return;
        }
        let lost = (0..5).any(|_| {
            let outcome = Session::new(config(Strategy::Unsynchronized, 8, 1_000_000))
                .unwrap()
                .run()
                .unwrap();
            assert!(outcome.actual <= 8_000_000);
            outcome.actual < 8_000_000
        });
        assert!(lost, "unsynchronized increments never raced");
    }

    #[test]
    fn test_timestamps_are_ordered() {
        let mut session = Session::new(config(Strategy::Atomic, 4, 50_000)).unwrap();
        let outcome = session.run().unwrap();
        assert!(outcome.begin_at <= outcome.first_start_at);
        assert!(outcome.first_start_at <= outcome.end_at);
        assert_eq!(session.begin_at(), Some(outcome.begin_at));
        assert_eq!(session.end_at(), Some(outcome.end_at));
        assert_eq!(session.counter_value(), outcome.actual);
    }

    #[test]
    fn test_no_worker_starts_before_begin() {
        for strategy in Strategy::ALL {
            for _ in 0..5 {
                let outcome = Session::new(config(strategy, 8, 1_000))
                    .unwrap()
                    .run()
                    .unwrap();
                assert!(outcome.first_start_at >= outcome.begin_at, "{strategy}");
            }
        }
    }

    #[test]
    #[ignore = "timing dependent; run on an idle multi-core machine"]
    fn test_spinlock_is_slower_than_atomic() {
        let per_second = |strategy| {
            Session::new(config(strategy, 16, 10_000))
                .unwrap()
                .run()
                .unwrap()
                .report()
                .per_second
        };
        assert!(per_second(Strategy::Spinlock) < per_second(Strategy::Atomic));
    }

    #[test]
    #[should_panic(expected = "a session runs only once")]
    fn test_run_twice_panics() {
        let mut session = Session::new(config(Strategy::Atomic, 1, 1)).unwrap();
        session.run().unwrap();
        let _ = session.run();
    }

    #[test]
    fn test_repeated_runs_are_independent() {
        for strategy in [Strategy::Atomic, Strategy::Spinlock, Strategy::Transactional] {
            let mut seen = Vec::new();
            run_repeated(config(strategy, 4, 10_000), 2, |run, outcome| {
                seen.push((run, outcome.actual));
                Ok::<_, Error>(())
            })
            .unwrap();
            assert_eq!(seen, vec![(0, 40_000), (1, 40_000)], "{strategy}");
        }
    }

    #[test]
    fn test_run_repeated_stops_on_sink_error() {
        let mut calls = 0;
        let result = run_repeated(config(Strategy::Atomic, 1, 10), 5, |_, _| {
            calls += 1;
            Err(Error::InvalidRuns(0))
        });
        assert_eq!(result, Err(Error::InvalidRuns(0)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_run_repeated_rejects_zero_runs() {
        let result = run_repeated(config(Strategy::Atomic, 1, 1), 0, |_, _| -> Result<()> {
            unreachable!("no run should happen")
        });
        assert_eq!(result, Err(Error::InvalidRuns(0)));
    }
}
