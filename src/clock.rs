//! Monotonic microsecond clock used to time a benchmark run.
//!
//! Timestamps are microseconds elapsed since a process-wide anchor, which is
//! fixed the first time the clock is read. The anchor is an
//! [`std::time::Instant`], so timestamps never go backwards within the
//! process and are unaffected by wall-clock adjustments. They carry no
//! calendar meaning.
//!
//! # Examples
//!
//! ```rust
//! use htmref::clock::Clock;
//!
//! let begin = Clock::now();
//! let end = Clock::now();
//! assert!(end >= begin);
//!
//! let elapsed = end.saturating_elapsed_since(begin);
//! assert!(elapsed.as_secs_f64() >= 0.0);
//! ```

use std::fmt::{self, Display};
use std::sync::OnceLock;
use std::time::Instant;

/// Number of microseconds in one second.
pub const USEC_PER_SEC: u64 = 1_000_000;

static ANCHOR: OnceLock<Instant> = OnceLock::new();

/// A point on the process-wide monotonic timeline, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from a raw microsecond offset.
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Returns the microsecond offset from the process anchor.
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Returns the time elapsed from `earlier` to `self`.
    ///
    /// Returns a zero duration if `earlier` is actually later, which cannot
    /// happen for two readings of [`Clock::now`] taken in order.
    pub const fn saturating_elapsed_since(self, earlier: Timestamp) -> Elapsed {
        Elapsed(self.0.saturating_sub(earlier.0))
    }
}

/// A span between two [`Timestamp`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Elapsed(u64);

impl Elapsed {
    /// Creates a span of `micros` microseconds.
    pub const fn from_micros(micros: u64) -> Self {
        Elapsed(micros)
    }

    /// Total span in microseconds.
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Whole seconds in the span.
    pub const fn secs(self) -> u64 {
        self.0 / USEC_PER_SEC
    }

    /// Microseconds past the last whole second.
    pub const fn subsec_micros(self) -> u64 {
        self.0 % USEC_PER_SEC
    }

    /// The span as fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / USEC_PER_SEC as f64
    }
}

impl Display for Elapsed {
    /// Formats as `<sec>.<usec>` with the microseconds zero-padded to six
    /// digits, e.g. `2.000450`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs(), self.subsec_micros())
    }
}

/// Source of [`Timestamp`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock;

impl Clock {
    /// Reads the monotonic clock.
    #[inline]
    pub fn now() -> Timestamp {
        let anchor = *ANCHOR.get_or_init(Instant::now);
        let micros = Instant::now().saturating_duration_since(anchor).as_micros();
        Timestamp(u64::try_from(micros).unwrap_or(u64::MAX))
    }
}
