//! Statistics derived from a completed run.
//!
//! A [`Report`] compares the expected total (`threads × iterations`) with the
//! counter's final value and turns the measured window into a throughput
//! figure. Its [`Display`] implementation is the canonical result line, the
//! only artifact of a run meant to be consumed by other tools:
//!
//! ```text
//! <selector> <threads> <iterations> <expected> <actual> <per_second> <sec>.<usec>
//! atomic 4 100000 400000 400000 41238761.984536 0.009700
//! ```
//!
//! Lines are appended to `samples/<name>/<selector>.txt` files and plotted
//! with columns 2 (threads) and 7 (elapsed seconds) by `htmref-graph`.

use std::fmt::{self, Display};

use crate::clock::{Elapsed, USEC_PER_SEC};
use crate::config::expected_total;
use crate::session::Outcome;
use crate::strategies::Strategy;

/// Expected versus actual totals, elapsed time and throughput of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    /// Strategy the workers used.
    pub strategy: Strategy,
    /// Number of workers.
    pub threads: u32,
    /// Increments attempted by each worker.
    pub iterations: u64,
    /// `threads × iterations`.
    pub expected: i64,
    /// Final counter value.
    pub actual: i64,
    /// Length of the measured window.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_elapsed"))]
    pub elapsed: Elapsed,
    /// Attempted increments per second over the window.
    pub per_second: f64,
}

impl Report {
    /// Computes the statistics for `outcome`.
    pub fn from_outcome(outcome: &Outcome) -> Self {
        let elapsed = outcome.end_at.saturating_elapsed_since(outcome.begin_at);
        Self::new(
            outcome.strategy,
            outcome.threads,
            outcome.iterations,
            outcome.actual,
            elapsed,
        )
    }

    /// Computes the statistics from raw figures.
    ///
    /// A window shorter than the clock's resolution counts as one
    /// microsecond, so `per_second` is always finite.
    ///
    /// ```rust
    /// use htmref::clock::Elapsed;
    /// use htmref::report::Report;
    /// use htmref::Strategy;
    ///
    /// let report = Report::new(Strategy::Atomic, 4, 100_000, 400_000, Elapsed::from_micros(500_000));
    /// assert_eq!(report.expected, 400_000);
    /// assert_eq!(report.per_second, 800_000.0);
    /// assert_eq!(report.to_string(), "atomic 4 100000 400000 400000 800000.000000 0.500000");
    /// ```
    pub fn new(
        strategy: Strategy,
        threads: u32,
        iterations: u64,
        actual: i64,
        elapsed: Elapsed,
    ) -> Self {
        let expected = expected_total(threads, iterations);
        let window = elapsed.micros().max(1);
        let per_second = expected as f64 / window as f64 * USEC_PER_SEC as f64;
        Report {
            strategy,
            threads,
            iterations,
            expected,
            actual,
            elapsed,
            per_second,
        }
    }

    /// Whether every increment was accounted for.
    pub fn is_exact(&self) -> bool {
        self.actual == self.expected
    }

    /// Increments missing from the final count.
    pub fn lost_updates(&self) -> i64 {
        self.expected.saturating_sub(self.actual).max(0)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {:.6} {}",
            self.strategy,
            self.threads,
            self.iterations,
            self.expected,
            self.actual,
            self.per_second,
            self.elapsed
        )
    }
}

#[cfg(feature = "serde")]
fn serialize_elapsed<S>(elapsed: &Elapsed, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(elapsed.as_secs_f64())
}
