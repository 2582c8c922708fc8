//! The canonical one-line-per-run output.
//!
//! Each report becomes one line of seven space-separated fields (see
//! [`Report`]'s `Display`). Lines from successive runs can be appended to
//! the same samples file.

use std::io::Write;

use crate::observers::Result;
use crate::report::Report;

/// Column header matching the fields of a result line.
pub const HEADER: &str = "command n_threads n_iterations expected actual per_second time";

/// Writes reports as result lines.
///
/// # Examples
///
/// ```rust
/// use htmref::clock::Elapsed;
/// use htmref::observers::line::LineObserver;
/// use htmref::report::Report;
/// use htmref::Strategy;
///
/// let report = Report::new(Strategy::Atomic, 1, 10, 10, Elapsed::from_micros(1_000_000));
/// let mut out = Vec::new();
/// LineObserver::new().write(&mut out, [&report]).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "atomic 1 10 10 10 10.000000 1.000000\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineObserver {
    header: bool,
}

impl LineObserver {
    /// Creates an observer that writes bare result lines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes [`HEADER`] before the first line.
    ///
    /// Leave this off when appending to samples files read by the plotter.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Renders the reports into a string, one line each.
    pub fn render<'a>(&self, reports: impl IntoIterator<Item = &'a Report>) -> String {
        let mut out = String::new();
        if self.header {
            out.push_str(HEADER);
            out.push('\n');
        }
        for report in reports {
            out.push_str(&report.to_string());
            out.push('\n');
        }
        out
    }

    /// Writes the reports to `out`, one line each, and flushes.
    pub fn write<'a>(
        &self,
        out: &mut impl Write,
        reports: impl IntoIterator<Item = &'a Report>,
    ) -> Result<()> {
        out.write_all(self.render(reports).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
