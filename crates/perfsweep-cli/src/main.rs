//! CLI tool for perfsweep.
//!
//! Provides commands for measuring single workloads, sweeping the full
//! parameter grid, and reporting over the cached results.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit code for a missing or unusable measured program.
const EXIT_CONFIGURATION: u8 = 2;

#[derive(Parser)]
#[command(name = "perfsweep")]
#[command(about = "Measure a program with perf stat across a parameter grid", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Directory holding cached records and artifacts
    #[arg(long, global = true, default_value = "results")]
    pub cache_dir: PathBuf,

    /// Program to measure
    #[arg(long, global = true, default_value = "./mandelbrot")]
    pub program: PathBuf,

    /// Counter harness executable
    #[arg(long, global = true, default_value = perfsweep_runner::DEFAULT_HARNESS)]
    pub harness: PathBuf,

    /// Artifact the program writes on every run
    #[arg(long, global = true, default_value = perfsweep_runner::DEFAULT_ARTIFACT)]
    pub artifact: PathBuf,

    /// Environment variable carrying the thread count
    #[arg(long, global = true, default_value = perfsweep_runner::DEFAULT_THREADS_ENV)]
    pub threads_env: String,

    /// Log debug output
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure every point of the parameter grid
    Sweep {
        /// Re-measure points that are already cached
        #[arg(long)]
        force: bool,

        /// JSON grid description (default: the standard grid)
        #[arg(long)]
        grid: Option<PathBuf>,

        /// Thread count exponents, e.g. `0..9` for 1..=256 threads
        #[arg(long, value_parser = parse_exponents)]
        threads_exp: Option<Range<u32>>,

        /// Image width exponents, e.g. `4..14` for 16..=8192 pixels
        #[arg(long, value_parser = parse_exponents)]
        width_exp: Option<Range<u32>>,
    },

    /// Measure a single workload
    Run {
        #[arg(long, allow_hyphen_values = true, value_parser = parse_bound)]
        real_min: f64,

        #[arg(long, allow_hyphen_values = true, value_parser = parse_bound)]
        real_max: f64,

        #[arg(long, allow_hyphen_values = true, value_parser = parse_bound)]
        imag_min: f64,

        #[arg(long, allow_hyphen_values = true, value_parser = parse_bound)]
        imag_max: f64,

        /// Image width in pixels
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        /// Harness samples
        #[arg(long, default_value_t = perfsweep_sweep::DEFAULT_REPEAT, value_parser = clap::value_parser!(u32).range(1..))]
        repeat: u32,

        /// Degree of parallelism of the measured program
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        threads: u32,

        /// Region label (default: the bounds joined by underscores)
        #[arg(long)]
        label: Option<String>,

        /// Comma-separated counters to measure
        #[arg(long, value_delimiter = ',')]
        events: Option<Vec<String>>,

        /// Re-measure even if cached
        #[arg(long)]
        force: bool,
    },

    /// Summarize cached results
    Report {
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },
}

/// Output formats of the report command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

fn parse_exponents(s: &str) -> std::result::Result<Range<u32>, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected `start..end`, got `{}`", s))?;
    let start: u32 = start.trim().parse().map_err(|e| format!("bad start: {}", e))?;
    let end: u32 = end.trim().parse().map_err(|e| format!("bad end: {}", e))?;
    if start > end || end > perfsweep_sweep::EXPONENT_LIMIT {
        return Err(format!("invalid exponent range `{}`", s));
    }
    Ok(start..end)
}

fn parse_bound(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|e| format!("bad bound `{}`: {}", s, e))?;
    if !value.is_finite() {
        return Err(format!("bound must be finite, got `{}`", s));
    }
    Ok(value)
}

/// Install the process-wide subscriber. Library crates only emit events.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn dispatch(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Commands::Sweep {
            force,
            grid,
            threads_exp,
            width_exp,
        } => commands::sweep(&global, force, grid.as_deref(), threads_exp, width_exp),
        Commands::Run {
            real_min,
            real_max,
            imag_min,
            imag_max,
            width,
            repeat,
            threads,
            label,
            events,
            force,
        } => {
            let mut descriptor = perfsweep_core::WorkloadDescriptor::new(
                real_min, real_max, imag_min, imag_max, width, repeat, threads, label,
            );
            if let Some(events) = events {
                descriptor = descriptor.with_events(events);
            }
            commands::run(&global, &descriptor, force)
        }
        Commands::Report { format } => commands::report(&global, format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            match err.downcast_ref::<perfsweep_core::Error>() {
                Some(perfsweep_core::Error::Configuration(_)) => ExitCode::from(EXIT_CONFIGURATION),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
