//! JSON observer for serializing reports.
//!
//! This module provides [`JsonObserver`], which serializes a collection of
//! [`Report`]s to JSON using serde.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! htmref = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use htmref::observers::json::JsonObserver;
//!
//! let json = JsonObserver::new().to_json(reports.iter())?;
//! // [{"strategy":"atomic","threads":4,"iterations":100000,"expected":400000,
//! //   "actual":400000,"elapsed":0.0097,"per_second":41237113.4}]
//! ```

use crate::observers::Result;
use crate::report::Report;

/// An observer that serializes reports to JSON.
///
/// By default the reports are written as one JSON array. With
/// [`lines`](Self::lines) enabled, each report becomes its own JSON object on
/// its own line, so the output of repeated runs can be appended to a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonObserver {
    pretty: bool,
    lines: bool,
}

impl JsonObserver {
    /// Creates a new JSON observer that writes a compact array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables pretty-printing.
    ///
    /// Ignored in [`lines`](Self::lines) mode.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.pretty = enabled;
        self
    }

    /// Enables or disables one-object-per-line output.
    pub fn lines(mut self, enabled: bool) -> Self {
        self.lines = enabled;
        self
    }

    /// Serializes reports to a JSON string.
    pub fn to_json<'a>(&self, reports: impl IntoIterator<Item = &'a Report>) -> Result<String> {
        if self.lines {
            let mut out = String::new();
            for report in reports {
                out.push_str(&serde_json::to_string(report)?);
                out.push('\n');
            }
            return Ok(out);
        }

        let reports: Vec<&Report> = reports.into_iter().collect();
        let json = if self.pretty {
            serde_json::to_string_pretty(&reports)?
        } else {
            serde_json::to_string(&reports)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Elapsed;
    use crate::strategies::Strategy;
    use serde_json::Value;

    fn report() -> Report {
        Report::new(Strategy::Transactional, 2, 1_000, 2_000, Elapsed::from_micros(500_000))
    }

    #[test]
    fn test_to_json_array() {
        let json = JsonObserver::new().to_json([&report()]).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["strategy"], "tsx");
        assert_eq!(first["threads"], 2);
        assert_eq!(first["iterations"], 1_000);
        assert_eq!(first["expected"], 2_000);
        assert_eq!(first["actual"], 2_000);
        assert_eq!(first["elapsed"], 0.5);
        assert_eq!(first["per_second"], 4_000.0);
    }

    #[test]
    fn test_to_json_empty() {
        let json = JsonObserver::new().to_json(std::iter::empty()).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_pretty() {
        let json = JsonObserver::new().pretty(true).to_json([&report()]).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("  "));
    }

    #[test]
    fn test_lines() {
        let reports = [report(), report()];
        let json = JsonObserver::new().lines(true).to_json(&reports).unwrap();
        let lines: Vec<&str> = json.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["actual"], 2_000);
        }
    }
}
