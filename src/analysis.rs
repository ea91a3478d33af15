//! Real-vs-random comparison driver.
//!
//! Loads both results files, then appends one section per statistic to
//! `statistics.txt` and writes the matching plots and CSV tables into the
//! output directory.

use crate::config::{AnalysisConfig, PlotConfig};
use crate::hardy_weinberg::{self, CommonHarmfulAnalysis};
use crate::report::{self, StatisticsReport};
use crate::results_parser;
use crate::statistics;
use crate::threshold::{self, ThresholdScan};
use crate::types::{LoadedVariants, ParseSummary, TTestResult, Variant};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const THRESHOLD_CSV: &str = "threshold_scan.csv";
pub const HW_CSV: &str = "hw_tests.csv";

/// What one comparison run produced.
#[derive(Debug, Clone)]
pub struct ComparisonSummary {
    pub real: ParseSummary,
    pub random: ParseSummary,
    pub n_real: usize,
    pub n_random: usize,
    /// `None` when either score sample was too small or constant
    pub t_test: Option<TTestResult>,
    pub threshold: ThresholdScan,
    /// `None` when no common harmful variant could be tested
    pub hardy_weinberg: Option<CommonHarmfulAnalysis>,
    pub report_path: PathBuf,
}

/// Run every comparison between the real and random results files.
pub fn run_comparison(
    real_path: &Path,
    random_path: &Path,
    out_dir: &Path,
    config: &AnalysisConfig,
) -> Result<ComparisonSummary> {
    config.validate()?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let report = StatisticsReport::create(out_dir)?;

    let LoadedVariants {
        variants: real,
        summary: real_summary,
    } = results_parser::load_results_file(real_path)?;
    let LoadedVariants {
        variants: random,
        summary: random_summary,
    } = results_parser::load_results_file(random_path)?;
    tracing::info!("Finished loading files.");

    #[cfg_attr(not(feature = "plotting"), allow(unused_variables))]
    let plots = active_plot_config(config);

    #[cfg(feature = "plotting")]
    if let Some(ref pc) = plots {
        plot_distributions(&real, &random, out_dir, config, pc)?;
    }

    let t_test = publish_t_test(&real, &random, &report)?;

    let scan = threshold::threshold_scan(&real, &random, config.intervals)?;
    report::write_threshold_scan(&scan, &out_dir.join(THRESHOLD_CSV))?;
    report.append(report::threshold_lines(&scan))?;

    #[cfg(feature = "plotting")]
    if let Some(ref pc) = plots {
        let path = out_dir.join(format!("thresh_dist.{}", pc.format.extension()));
        crate::plotting::plot_threshold_scan(&scan, &path, pc)?;
    }

    let hardy_weinberg = match hardy_weinberg::common_harmful_analysis(&real, config) {
        Ok(analysis) => {
            report.append(report::hardy_weinberg_lines(&analysis))?;
            report::write_hw_tests(&analysis, &out_dir.join(HW_CSV))?;

            #[cfg(feature = "plotting")]
            if let Some(ref pc) = plots {
                let ext = pc.format.extension();
                crate::plotting::plot_chisq_vs_score(
                    &analysis,
                    &out_dir.join(format!("chisq_vs_silva.{}", ext)),
                    pc,
                )?;
                crate::plotting::plot_percent_vs_cutoff(
                    &analysis,
                    &out_dir.join(format!("percent_vs_silva.{}", ext)),
                    pc,
                )?;
            }

            Some(analysis)
        }
        Err(e) => {
            tracing::warn!("Hardy-Weinberg analysis skipped: {}", e);
            report.append([format!("Hardy-Weinberg deviation rate is undefined: {}", e)])?;
            None
        }
    };

    Ok(ComparisonSummary {
        real: real_summary,
        random: random_summary,
        n_real: real.len(),
        n_random: random.len(),
        t_test,
        threshold: scan,
        hardy_weinberg,
        report_path: report.path().to_path_buf(),
    })
}

/// Welch's t-test on the two score samples, appended to the report.
fn publish_t_test(
    real: &[Variant],
    random: &[Variant],
    report: &StatisticsReport,
) -> Result<Option<TTestResult>> {
    let real_scores: Vec<f64> = real.iter().map(|v| v.score).collect();
    let random_scores: Vec<f64> = random.iter().map(|v| v.score).collect();

    match statistics::welch_t_test(&real_scores, &random_scores) {
        Ok(result) => {
            report.append(report::t_test_lines(real.len(), random.len(), &result))?;
            Ok(Some(result))
        }
        Err(e) => {
            tracing::warn!("Welch's t-test skipped: {}", e);
            report.append([
                format!(
                    "In total there are {} original variants and {} matched random variants",
                    real.len(),
                    random.len()
                ),
                format!("Welch's t-test is undefined: {}", e),
            ])?;
            Ok(None)
        }
    }
}

#[cfg(feature = "plotting")]
fn active_plot_config(config: &AnalysisConfig) -> Option<PlotConfig> {
    let pc = config.plots.clone()?;
    match crate::plotting::ensure_fonts() {
        Ok(()) => Some(pc),
        Err(e) => {
            tracing::warn!("plots disabled: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "plotting"))]
fn active_plot_config(config: &AnalysisConfig) -> Option<PlotConfig> {
    if config.plots.is_some() {
        tracing::warn!("plotting feature not enabled; rebuild with default features to enable plots");
    }
    None
}

/// Frequency scatter plus score histograms per frequency band, with and
/// without the low-score floor.
#[cfg(feature = "plotting")]
fn plot_distributions(
    real: &[Variant],
    random: &[Variant],
    out_dir: &Path,
    config: &AnalysisConfig,
    pc: &PlotConfig,
) -> Result<()> {
    use crate::distribution::{self, FREQUENCY_BANDS};
    use crate::plotting;

    let ext = pc.format.extension();
    plotting::plot_freq(real, &out_dir.join(format!("freq.{}", ext)), pc)?;

    let edges = distribution::log_bins(0.001, 1.0, config.histogram_edges);
    for (floor, suffix) in [(None, ""), (Some(config.nonzero_floor), "_nz")] {
        for band in &FREQUENCY_BANDS {
            for (name, variants) in [("original", real), ("random", random)] {
                let hist = distribution::band_histogram(variants, band, floor, edges.clone());
                let file = format!("{}_dist_{}{}.{}", name, band.label, suffix, ext);
                let title = format!("{} scores, {}{}", name, band.label, suffix);
                plotting::plot_score_histogram(&hist, &title, &out_dir.join(file), pc)?;
            }
        }
    }
    Ok(())
}
