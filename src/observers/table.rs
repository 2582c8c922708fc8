//! Human-readable tables of run results (feature `table`).
//!
//! ```text
//! ╭──────────┬─────────┬────────────┬──────────┬──────────┬──────┬──────────────┬──────────╮
//! │ Strategy │ Threads │ Iterations │ Expected │ Actual   │ Lost │ Per second   │ Time (s) │
//! ├──────────┼─────────┼────────────┼──────────┼──────────┼──────┼──────────────┼──────────┤
//! │ atomic   │ 4       │ 100000     │ 400000   │ 400000   │ 0    │ 41238761.98  │ 0.009700 │
//! ╰──────────┴─────────┴────────────┴──────────┴──────────┴──────┴──────────────┴──────────╯
//! ```

use crate::report::Report;
use tabled::settings::object::Rows;
use tabled::settings::{Remove, Style};
use tabled::{Table, Tabled};

/// Border style of the rendered table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// `+`, `-` and `|` only.
    Ascii,
    /// Box drawing with rounded corners.
    #[default]
    Rounded,
    /// Box drawing with square corners.
    Sharp,
    /// A Markdown table, for pasting results into issues and notes.
    Markdown,
    /// Columns aligned with spaces, no borders.
    Blank,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Strategy")]
    strategy: &'static str,
    #[tabled(rename = "Threads")]
    threads: u32,
    #[tabled(rename = "Iterations")]
    iterations: u64,
    #[tabled(rename = "Expected")]
    expected: i64,
    #[tabled(rename = "Actual")]
    actual: i64,
    #[tabled(rename = "Lost")]
    lost: i64,
    #[tabled(rename = "Per second")]
    per_second: String,
    #[tabled(rename = "Time (s)")]
    time: String,
}

impl From<&Report> for ReportRow {
    fn from(report: &Report) -> Self {
        ReportRow {
            strategy: report.strategy.selector(),
            threads: report.threads,
            iterations: report.iterations,
            expected: report.expected,
            actual: report.actual,
            lost: report.lost_updates(),
            per_second: format!("{:.2}", report.per_second),
            time: report.elapsed.to_string(),
        }
    }
}

/// Renders reports as a table, one row per run, with the lost-update count
/// spelled out.
///
/// ```rust
/// use htmref::clock::Elapsed;
/// use htmref::observers::table::{TableObserver, TableStyle};
/// use htmref::report::Report;
/// use htmref::Strategy;
///
/// let report = Report::new(Strategy::Unsynchronized, 8, 1_000, 7_250, Elapsed::from_micros(40));
/// let output = TableObserver::new()
///     .with_style(TableStyle::Markdown)
///     .with_title("8 threads")
///     .render([&report]);
/// assert!(output.starts_with("8 threads\n"));
/// assert!(output.contains("| addq"));
/// ```
#[derive(Debug, Clone)]
pub struct TableObserver {
    style: TableStyle,
    header: bool,
    title: Option<String>,
}

impl Default for TableObserver {
    fn default() -> Self {
        TableObserver {
            style: TableStyle::default(),
            header: true,
            title: None,
        }
    }
}

impl TableObserver {
    /// Rounded borders, with a header row and no title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the border style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Shows or hides the column names.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Prints `title` on its own line above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Renders `reports` in the order given.
    pub fn render<'a>(&self, reports: impl IntoIterator<Item = &'a Report>) -> String {
        let rows: Vec<ReportRow> = reports.into_iter().map(ReportRow::from).collect();
        let mut table = Table::new(rows);

        match self.style {
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Sharp => table.with(Style::sharp()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Blank => table.with(Style::blank()),
        };
        if !self.header {
            table.with(Remove::row(Rows::first()));
        }

        match &self.title {
            Some(title) => format!("{title}\n{table}"),
            None => table.to_string(),
        }
    }
}
