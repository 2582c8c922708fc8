//! Command line front end: run one strategy and print a result line per run.
//!
//! Run with:
//! ```bash
//! cargo run --release --bin htmref -- tsx 10 100000
//! cargo run --release --bin htmref -- addq 1 1000000 3 >> samples/laptop/addq.txt
//! ```

use std::io::{self, Write};
use std::process;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use htmref::config::{
    DEFAULT_ITERATIONS, DEFAULT_RUNS, DEFAULT_THREADS, MAX_ITERATIONS, MAX_STACK_SIZE,
    MAX_THREADS, MIN_STACK_SIZE,
};
use htmref::observers::json::JsonObserver;
use htmref::observers::line::LineObserver;
use htmref::observers::table::{TableObserver, TableStyle};
use htmref::pool::DEFAULT_STACK_SIZE;
use htmref::session::run_repeated;
use htmref::{Report, SessionConfig, Strategy};
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
Examples:
  htmref tsx 10 100000
  htmref atomic
  htmref addq 1 1000000 3
  htmref spinlock";

/// Output format for the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One space-separated line per run, printed as each run finishes
    Line,
    /// A table of all runs, printed at the end
    Table,
    /// A JSON array of all runs, printed at the end
    Json,
}

/// This program tests various implementations of reference counting.
/// Not all implementations are guaranteed full correctness.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
struct Args {
    /// Counter implementation to benchmark
    #[arg(value_enum)]
    command: Strategy,

    /// Number of worker threads
    #[arg(
        default_value_t = DEFAULT_THREADS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_THREADS as i64)
    )]
    n_threads: u32,

    /// Increments performed by each thread
    #[arg(
        default_value_t = DEFAULT_ITERATIONS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_ITERATIONS)
    )]
    n_iterations: u64,

    /// Number of back-to-back runs
    #[arg(
        default_value_t = DEFAULT_RUNS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    n_runs: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "line")]
    format: OutputFormat,

    /// Print a column header before the result lines (line format only)
    #[arg(long)]
    header: bool,

    /// Stack size of each worker thread, in bytes
    #[arg(
        long,
        default_value_t = DEFAULT_STACK_SIZE as u64,
        value_parser = clap::value_parser!(u64).range(MIN_STACK_SIZE as u64..=MAX_STACK_SIZE as u64)
    )]
    stack_size: u64,
}

/// Parses the command line, printing the usage line and the examples after
/// any argument error.
fn parse_args() -> Args {
    let err = match Args::try_parse() {
        Ok(args) => return args,
        Err(err) => err,
    };
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
        _ => {
            let usage = Args::command().render_usage();
            eprint!("{err}");
            eprintln!("\n{usage}\n\n{EXAMPLES}");
            process::exit(1);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = parse_args();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("htmref=warn")),
        )
        .init();

    let stack_size =
        usize::try_from(args.stack_size).context("stack size does not fit in memory")?;
    let config = SessionConfig::new(args.command)
        .with_threads(args.n_threads)
        .with_iterations(args.n_iterations)
        .with_stack_size(stack_size);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let line = LineObserver::new();
    if args.format == OutputFormat::Line && args.header {
        writeln!(out, "{}", htmref::observers::line::HEADER)?;
    }

    let mut reports: Vec<Report> = Vec::new();
    run_repeated(config, args.n_runs, |run, outcome| -> anyhow::Result<()> {
        let report = outcome.report();
        if !report.is_exact() {
            tracing::warn!(run, lost = report.lost_updates(), "increments were lost");
        }
        match args.format {
            OutputFormat::Line => line
                .write(&mut out, [&report])
                .context("failed to write result line")?,
            OutputFormat::Table | OutputFormat::Json => reports.push(report),
        }
        Ok(())
    })?;

    match args.format {
        OutputFormat::Line => {}
        OutputFormat::Table => {
            let table = TableObserver::new()
                .with_style(TableStyle::Rounded)
                .render(&reports);
            writeln!(out, "{table}")?;
        }
        OutputFormat::Json => {
            let json = JsonObserver::new().pretty(true).to_json(&reports)?;
            writeln!(out, "{json}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["htmref", "atomic"]).unwrap();
        assert_eq!(args.command, Strategy::Atomic);
        assert_eq!(args.n_threads, 10);
        assert_eq!(args.n_iterations, 10_000_000);
        assert_eq!(args.n_runs, 1);
        assert_eq!(args.format, OutputFormat::Line);
        assert_eq!(args.stack_size, DEFAULT_STACK_SIZE as u64);
    }

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["htmref", "addq", "1", "1000000", "3"]).unwrap();
        assert_eq!(args.command, Strategy::Unsynchronized);
        assert_eq!(args.n_threads, 1);
        assert_eq!(args.n_iterations, 1_000_000);
        assert_eq!(args.n_runs, 3);
    }

    #[test]
    fn test_selector_mapping() {
        for (selector, strategy) in [
            ("tsx", Strategy::Transactional),
            ("addq", Strategy::Unsynchronized),
            ("atomic", Strategy::Atomic),
            ("spinlock", Strategy::Spinlock),
        ] {
            let args = Args::try_parse_from(["htmref", selector]).unwrap();
            assert_eq!(args.command, strategy);
            assert_eq!(strategy.selector(), selector);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Args::try_parse_from(["htmref"]).is_err());
        assert!(Args::try_parse_from(["htmref", "mutex"]).is_err());
        assert!(Args::try_parse_from(["htmref", "atomic", "0"]).is_err());
        assert!(Args::try_parse_from(["htmref", "atomic", "10001"]).is_err());
        assert!(Args::try_parse_from(["htmref", "atomic", "4", "0"]).is_err());
        assert!(Args::try_parse_from(["htmref", "atomic", "4", "10", "0"]).is_err());
        assert!(Args::try_parse_from(["htmref", "atomic", "-3"]).is_err());
    }

    #[test]
    fn test_stack_size_bounds() {
        let parse = |size: &str| Args::try_parse_from(["htmref", "--stack-size", size, "atomic"]);
        assert_eq!(parse("65536").unwrap().stack_size, 65_536);
        assert_eq!(parse("1073741824").unwrap().stack_size, 1 << 30);
        assert!(parse("65535").is_err());
        assert!(parse("1099511627776").is_err());
        assert!(parse("18446744073709551615").is_err());
    }

    #[test]
    fn test_help_lists_strategy_descriptions() {
        let help = Args::command().render_long_help().to_string();
        for strategy in Strategy::ALL {
            assert!(help.contains(strategy.selector()), "{strategy}");
            assert!(help.contains(strategy.description()), "{strategy}");
        }
    }

    #[test]
    fn test_thread_bounds_inclusive() {
        assert!(Args::try_parse_from(["htmref", "atomic", "1"]).is_ok());
        assert!(Args::try_parse_from(["htmref", "atomic", "10000"]).is_ok());
    }
}
