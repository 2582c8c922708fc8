//! Interchangeable ways of incrementing the shared counter.
//!
//! Every strategy has the same shape: given the [`CounterCell`] and an
//! iteration count, add one to the counter that many times. They differ only
//! in the concurrency control wrapped around each increment:
//!
//! | Strategy | Selector | Mechanism | Exact under contention |
//! |----------|----------|-----------|------------------------|
//! | [`Unsynchronized`](Strategy::Unsynchronized) | `addq` | load, then store | no |
//! | [`Atomic`](Strategy::Atomic) | `atomic` | hardware fetch-and-add | yes |
//! | [`Spinlock`](Strategy::Spinlock) | `spinlock` | busy-wait lock around load/store | yes |
//! | [`Transactional`](Strategy::Transactional) | `tsx` | RTM transaction, fetch-and-add on abort | yes |
//!
//! The unsynchronized strategy is the negative control. Its final count falls
//! short of the expected total whenever two threads interleave their
//! read-modify-write sequences.

pub mod atomic;
pub mod spinlock;
pub mod transactional;
pub mod unsynchronized;

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::cell::CounterCell;
use crate::error::Error;

/// One of the four increment strategies.
///
/// # Examples
///
/// ```rust
/// use htmref::cell::CounterCell;
/// use htmref::Strategy;
///
/// let strategy: Strategy = "atomic".parse().unwrap();
/// let cell = CounterCell::new();
/// strategy.run(&cell, 1_000);
/// assert_eq!(cell.value(), 1_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Plain read-modify-write with no coordination (`addq`).
    #[cfg_attr(feature = "serde", serde(rename = "addq"))]
    Unsynchronized,
    /// Atomic fetch-and-add (`atomic`).
    #[cfg_attr(feature = "serde", serde(rename = "atomic"))]
    Atomic,
    /// Increment under a busy-wait lock (`spinlock`).
    #[cfg_attr(feature = "serde", serde(rename = "spinlock"))]
    Spinlock,
    /// Hardware transaction with an atomic fallback (`tsx`).
    #[cfg_attr(feature = "serde", serde(rename = "tsx"))]
    Transactional,
}

impl Strategy {
    /// Every strategy, in the order the plots list them.
    pub const ALL: [Strategy; 4] = [
        Strategy::Atomic,
        Strategy::Transactional,
        Strategy::Spinlock,
        Strategy::Unsynchronized,
    ];

    /// The command-line selector naming this strategy.
    pub const fn selector(self) -> &'static str {
        match self {
            Strategy::Unsynchronized => "addq",
            Strategy::Atomic => "atomic",
            Strategy::Spinlock => "spinlock",
            Strategy::Transactional => "tsx",
        }
    }

    /// One-line description shown in the command-line help.
    pub const fn description(self) -> &'static str {
        match self {
            Strategy::Unsynchronized => "Use ++ for reference count incrementing",
            Strategy::Atomic => "Use atomic intrinsics for thread-safe reference counts",
            Strategy::Spinlock => "Use a spinlock to guard the counter",
            Strategy::Transactional => "Use Intel TSX instructions for transactional memory",
        }
    }

    /// Name used in plot legends.
    pub const fn title(self) -> &'static str {
        match self {
            Strategy::Unsynchronized => "Addq",
            Strategy::Atomic => "Atomic",
            Strategy::Spinlock => "Spinlock",
            Strategy::Transactional => "Intel TSX",
        }
    }

    /// Whether the final count is guaranteed to equal the number of
    /// increments performed, regardless of contention.
    pub const fn is_exact(self) -> bool {
        !matches!(self, Strategy::Unsynchronized)
    }

    /// Performs `iterations` increments of `cell`.
    #[inline]
    pub fn run(self, cell: &CounterCell, iterations: u64) {
        match self {
            Strategy::Unsynchronized => unsynchronized::run(cell, iterations),
            Strategy::Atomic => atomic::run(cell, iterations),
            Strategy::Spinlock => spinlock::run(cell, iterations),
            Strategy::Transactional => transactional::run(cell, iterations),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.selector() == s)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}

#[cfg(feature = "cli")]
impl clap::ValueEnum for Strategy {
    fn value_variants<'a>() -> &'a [Self] {
        &Strategy::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.selector()).help(self.description()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.selector().parse::<Strategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_selector_mapping() {
        assert_eq!("tsx".parse(), Ok(Strategy::Transactional));
        assert_eq!("addq".parse(), Ok(Strategy::Unsynchronized));
        assert_eq!("atomic".parse(), Ok(Strategy::Atomic));
        assert_eq!("spinlock".parse(), Ok(Strategy::Spinlock));
    }

    #[test]
    fn test_unknown_selector() {
        assert_eq!(
            "mutex".parse::<Strategy>(),
            Err(Error::UnknownStrategy("mutex".to_string()))
        );
        assert!("ATOMIC".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_display_is_selector() {
        assert_eq!(Strategy::Transactional.to_string(), "tsx");
        assert_eq!(Strategy::Unsynchronized.to_string(), "addq");
    }

    #[test]
    fn test_titles() {
        assert_eq!(Strategy::Atomic.title(), "Atomic");
        assert_eq!(Strategy::Transactional.title(), "Intel TSX");
        assert_eq!(Strategy::Spinlock.title(), "Spinlock");
        assert_eq!(Strategy::Unsynchronized.title(), "Addq");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_value_enum_uses_selectors() {
        use clap::ValueEnum;

        for strategy in Strategy::ALL {
            let value = strategy.to_possible_value().unwrap();
            assert_eq!(value.get_name(), strategy.selector());
            assert_eq!(
                value.get_help().map(|help| help.to_string()),
                Some(strategy.description().to_string())
            );
            assert_eq!(<Strategy as ValueEnum>::from_str(strategy.selector(), false), Ok(strategy));
        }
        assert!(<Strategy as ValueEnum>::from_str("mutex", false).is_err());
    }

    #[test]
    fn test_is_exact() {
        assert!(!Strategy::Unsynchronized.is_exact());
        assert!(Strategy::Atomic.is_exact());
        assert!(Strategy::Spinlock.is_exact());
        assert!(Strategy::Transactional.is_exact());
    }

    #[test]
    fn test_single_thread_run_is_exact_for_every_strategy() {
        for strategy in Strategy::ALL {
            let cell = CounterCell::new();
            strategy.run(&cell, 10_000);
            assert_eq!(cell.value(), 10_000, "{strategy}");
        }
    }

    #[test]
    fn test_zero_iterations_is_noop() {
        for strategy in Strategy::ALL {
            let cell = CounterCell::new();
            strategy.run(&cell, 0);
            assert_eq!(cell.value(), 0, "{strategy}");
        }
    }
}
