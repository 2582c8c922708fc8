//! Plots recorded samples with gnuplot.
//!
//! Expects one results file per strategy under `samples/<SAMPLE>/`, each
//! holding result lines as printed by `htmref`, and writes
//! `samples/<SAMPLE>/time.png` with elapsed time against thread count.
//!
//! ```bash
//! for n in $(seq 1 20); do
//!     htmref atomic $n 1000000 >> samples/laptop/atomic.txt
//! done
//! cargo run --release --bin htmref-graph -- laptop
//! ```

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context};
use clap::Parser;
use htmref::Strategy;
use tracing_subscriber::EnvFilter;

/// Line style per plotted series: width, colour, point size, point type,
/// point interval.
const LINE_STYLES: [(u32, &str, u32, u32, u32); 4] = [
    (4, "#990042", 2, 6, 5),
    (3, "#31f120", 2, 12, 3),
    (3, "#0044a5", 2, 9, 5),
    (4, "#888888", 2, 7, 4),
];

/// Plot samples recorded with htmref.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sample name: results are read from samples/SAMPLE/*.txt
    sample: String,

    /// Upper end of the thread-count axis
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(2..))]
    max_threads: u32,

    /// Iterations per thread the samples were recorded with (used in the title)
    #[arg(long, default_value_t = 1_000_000)]
    iterations: u64,
}

fn legend(strategy: Strategy) -> String {
    let verdict = if strategy.is_exact() { "Correct" } else { "Incorrect" };
    format!("{} ({verdict})", strategy.title())
}

/// Builds the gnuplot script for `sample`.
fn plot_script(sample: &str, max_threads: u32, iterations: u64) -> String {
    let mut script = String::new();
    script.push_str("set term png size 1024,768\n");
    script.push_str(&format!("set out 'samples/{sample}/time.png'\n"));
    script.push_str("set key top left\n");
    script.push_str("set xlabel 'Thread Count'\n");
    script.push_str("set ylabel 'Time (in Seconds)'\n");
    script.push_str(&format!(
        "set title 'Execution Time ({iterations} iterations per thread)'\n"
    ));
    script.push_str("set style function linespoints\n");
    for (i, (width, colour, size, kind, interval)) in LINE_STYLES.iter().enumerate() {
        script.push_str(&format!(
            "set style line {} lw {width} lc rgb '{colour}' ps {size} pt {kind} pi {interval}\n",
            i + 1
        ));
    }

    let series: Vec<String> = Strategy::ALL
        .iter()
        .map(|&strategy| {
            format!(
                "'samples/{sample}/{}.txt' using 2:7 with linespoints title '{}'",
                strategy.selector(),
                legend(strategy)
            )
        })
        .collect();
    script.push_str(&format!("plot [1:{max_threads}] {}\n", series.join(", ")));
    script
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("htmref=warn")),
        )
        .init();

    let script = plot_script(&args.sample, args.max_threads, args.iterations);
    tracing::debug!(sample = %args.sample, "plotting");

    let mut gnuplot = Command::new("gnuplot")
        .arg("-persist")
        .stdin(Stdio::piped())
        .spawn()
        .context("failed to execute gnuplot")?;

    {
        let mut stdin = gnuplot
            .stdin
            .take()
            .context("gnuplot stdin is not piped")?;
        stdin
            .write_all(script.as_bytes())
            .context("failed to send script to gnuplot")?;
    }

    let status = gnuplot.wait().context("failed to wait for gnuplot")?;
    if !status.success() {
        bail!("gnuplot exited with {status}");
    }
    tracing::info!(out = %format!("samples/{}/time.png", args.sample), "plot written");
    Ok(())
}
