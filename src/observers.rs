//! Renderers for benchmark [`Report`](crate::report::Report)s.
//!
//! - [`line`] - the canonical space-separated result line, always available
//! - [`table`] - pretty-print reports as tables using the `tabled` crate
//! - [`json`] - serialize reports to JSON
//!
//! Only the line format is meant for the plotting tools; the others are for
//! people reading results.
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `full` - Enables every observer plus the command line tools
//!
//! # Example
//!
//! ```rust,ignore
//! use htmref::observers::table::TableObserver;
//! use htmref::{Session, SessionConfig, Strategy};
//!
//! let reports: Vec<_> = Strategy::ALL
//!     .into_iter()
//!     .map(|strategy| {
//!         let config = SessionConfig::new(strategy).with_iterations(100_000);
//!         Session::new(config).unwrap().run().unwrap().report()
//!     })
//!     .collect();
//!
//! println!("{}", TableObserver::new().render(reports.iter()));
//! ```

mod error;

pub use error::{ObserverError, Result};

pub mod line;

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;
