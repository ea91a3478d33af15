use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use silva_compare::{
    analysis::{self, ComparisonSummary},
    config::{AnalysisConfig, PlotConfig, PlotFormat},
    feature_stats,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "silva-compare")]
#[command(version)]
#[command(about = "Compare silva scores of real variants against matched random variants", long_about = None)]
struct Cli {
    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log filter (e.g. "info", "debug", "silva_compare=trace")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare score distributions of real and random variants
    Compare(CompareArgs),
    /// Report mean and variance of every column of a feature matrix
    FeatureStats(FeatureStatsArgs),
}

#[derive(Args)]
struct CompareArgs {
    /// Results from original variants
    #[arg(value_name = "ORIG_RES")]
    real: PathBuf,

    /// Results from randomly generated variants
    #[arg(value_name = "RAND_RES")]
    random: PathBuf,

    /// Directory in which to put resulting plots and analysis
    #[arg(value_name = "OUT_DIR")]
    out: PathBuf,

    /// Number of log-spaced score thresholds between 1e-3 and 1e-1 (odd)
    #[arg(long, default_value = "129")]
    intervals: usize,

    /// Scores above this are treated as harmful
    #[arg(long, default_value = "0.05")]
    harmful_threshold: f64,

    /// Allele frequencies above this are treated as common
    #[arg(long, default_value = "0.05")]
    common_threshold: f64,

    /// Significance level for Hardy-Weinberg deviation
    #[arg(long, default_value = "0.05")]
    hw_alpha: f64,

    /// Scores at or below this are dropped from the "_nz" histograms
    #[arg(long, default_value = "0.01")]
    nonzero_floor: f64,

    /// Skip plot generation
    #[arg(long)]
    no_plots: bool,

    /// Plot output format: "png" (default) or "svg"
    #[arg(long, default_value = "png")]
    plot_format: String,

    /// Number of threads for parallel processing
    #[arg(long, default_value_t = num_cpus())]
    threads: usize,
}

#[derive(Args)]
struct FeatureStatsArgs {
    /// Feature matrix (reads stdin when omitted)
    #[arg(value_name = "MATRIX")]
    input: Option<PathBuf>,
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

macro_rules! progress {
    ($quiet:expr) => {
        if !$quiet {
            eprintln!();
        }
    };
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

fn make_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn init_logging(level: &str, quiet: bool) {
    let level = if quiet { "warn" } else { level };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet);

    match cli.command {
        Command::Compare(ref args) => run_compare(args, cli.quiet),
        Command::FeatureStats(ref args) => run_feature_stats(args),
    }
}

fn run_compare(args: &CompareArgs, quiet: bool) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .context("Failed to configure thread pool")?;

    let plots = if args.no_plots {
        None
    } else {
        Some(PlotConfig {
            format: PlotFormat::parse(&args.plot_format)?,
            ..PlotConfig::default()
        })
    };

    let config = AnalysisConfig {
        intervals: args.intervals,
        harmful_threshold: args.harmful_threshold,
        common_threshold: args.common_threshold,
        hw_alpha: args.hw_alpha,
        nonzero_floor: args.nonzero_floor,
        plots,
        ..AnalysisConfig::default()
    };
    config.validate()?;

    progress!(quiet, "Silva score comparison");
    progress!(quiet, "=========================================");
    progress!(quiet, "Real variants:   {}", args.real.display());
    progress!(quiet, "Random variants: {}", args.random.display());
    progress!(quiet, "Output dir:      {}", args.out.display());
    progress!(quiet, "Intervals: {}", config.intervals);
    progress!(quiet, "Harmful threshold: {}", config.harmful_threshold);
    progress!(quiet, "Common threshold: {}", config.common_threshold);
    progress!(quiet, "Plots: {}", if config.plots.is_some() { args.plot_format.as_str() } else { "disabled" });
    progress!(quiet);

    let pb = make_spinner(quiet);
    pb.set_message("running comparison");
    let summary = analysis::run_comparison(&args.real, &args.random, &args.out, &config);
    pb.finish_and_clear();
    let summary = summary?;

    report_summary(&summary, quiet);
    Ok(())
}

fn report_summary(summary: &ComparisonSummary, quiet: bool) {
    progress!(quiet, "Real variants loaded: {} ({} skipped, {} multi-allelic)",
        summary.n_real, summary.real.skipped(), summary.real.multiallelic);
    progress!(quiet, "Random variants loaded: {} ({} skipped, {} multi-allelic)",
        summary.n_random, summary.random.skipped(), summary.random.multiallelic);

    match &summary.t_test {
        Some(t) => progress!(quiet, "  Welch's t: {:.3} (p = {:.3e})", t.t, t.p_value),
        None => progress!(quiet, "  Welch's t: undefined"),
    }
    if let Some(max) = summary.threshold.maximum() {
        progress!(quiet, "  Max threshold: {:.4} ({} more random than real)", max.threshold, max.difference());
    }
    match &summary.hardy_weinberg {
        Some(hw) => progress!(quiet, "  HW deviating: {} / {}", hw.deviating, hw.tested.len()),
        None => progress!(quiet, "  HW deviating: undefined"),
    }

    progress!(quiet);
    progress!(quiet, "Done! Statistics written to: {}", summary.report_path.display());
}

fn run_feature_stats(args: &FeatureStatsArgs) -> Result<()> {
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("Failed to open feature matrix: {}", path.display())
        })?)),
        None => {
            if io::stdin().is_terminal() {
                anyhow::bail!("Usage: silva-compare feature-stats < CONTROL.MAT > CONTROL.STATS");
            }
            Box::new(io::stdin().lock())
        }
    };

    let matrix = feature_stats::read_feature_matrix(reader)?;
    tracing::debug!("read {} rows", matrix.rows());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for summary in matrix.summaries()? {
        writeln!(out, "{}", feature_stats::format_summary(&summary))?;
    }
    Ok(())
}
