//! # htmref - Counter Increment Strategies Under Contention
//!
//! A benchmark engine that measures how fast, and how correctly, several
//! threads can increment one shared counter using different concurrency
//! control techniques.
//!
//! ## The Problem
//!
//! Reference counts, statistics and sequence numbers are often a single
//! integer updated from many threads. How that integer is updated decides
//! both whether the result is right and how badly the cores fight over the
//! cache line holding it. This crate puts the common answers side by side
//! under the same controlled, simultaneous contention.
//!
//! ## Strategies
//!
//! | Strategy | Selector | Mechanism | Exact |
//! |----------|----------|-----------|-------|
//! | [`Unsynchronized`](Strategy::Unsynchronized) | `addq` | plain read-modify-write | no |
//! | [`Atomic`](Strategy::Atomic) | `atomic` | hardware fetch-and-add | yes |
//! | [`Spinlock`](Strategy::Spinlock) | `spinlock` | busy-wait lock | yes |
//! | [`Transactional`](Strategy::Transactional) | `tsx` | Intel RTM, fetch-and-add on abort | yes |
//!
//! The unsynchronized strategy is included to show lost updates: under
//! contention its final count falls short of the expected total.
//!
//! ## How a Run Works
//!
//! ```text
//!   Session::run
//!     │
//!     ├─ spawn N workers ──► each registers at the StartBarrier and parks
//!     ├─ wait until all N are parked
//!     ├─ begin_at = Clock::now()  ──► release: all workers start together
//!     │                                  │
//!     │                          strategy.run(cell, iterations)
//!     │                                  │
//!     ├─ join all N workers ◄────────────┘
//!     └─ end_at = Clock::now()
//! ```
//!
//! 1. **Start barrier**: no worker increments before every worker is ready, so
//!    the measured window captures true contention, not staggered starts.
//! 2. **Cache-line isolation**: the counter occupies a cache line of its own
//!    ([`crossbeam_utils::CachePadded`]), so only the counter itself is
//!    contended.
//! 3. **Join before stamping**: `end_at` is taken after the last worker has
//!    been joined, so it follows every increment.
//!
//! ## Quick Start
//!
//! ```rust
//! use htmref::{Session, SessionConfig, Strategy};
//!
//! let config = SessionConfig::new(Strategy::Atomic)
//!     .with_threads(4)
//!     .with_iterations(100_000);
//!
//! let outcome = Session::new(config)?.run()?;
//! let report = outcome.report();
//! assert_eq!(report.expected, 400_000);
//! assert_eq!(report.actual, 400_000);
//!
//! // atomic 4 100000 400000 400000 <per_second> <sec>.<usec>
//! println!("{report}");
//! # Ok::<(), htmref::Error>(())
//! ```
//!
//! ## Command Line
//!
//! With the default `cli` feature the crate builds two binaries:
//!
//! - `htmref COMMAND [N_THREADS [N_ITERATIONS [N_RUNS]]]` prints one result
//!   line per run.
//! - `htmref-graph SAMPLE` plots `samples/SAMPLE/*.txt` with gnuplot.
//!
//! ## Observers
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | (always) | [`observers::line`] | Canonical one-line result format |
//! | `table` | `observers::table` | Pretty-print reports as tables |
//! | `json` | `observers::json` | Serialize reports to JSON |

pub mod barrier;
pub mod cell;
pub mod clock;
pub mod config;
pub mod error;
pub mod observers;
pub mod pool;
pub mod report;
pub mod session;
pub mod spinlock;
pub mod strategies;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use report::Report;
pub use session::{Outcome, Session};
pub use strategies::Strategy;
