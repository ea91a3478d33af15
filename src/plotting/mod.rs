mod histogram;
mod scatter;

use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use std::sync::OnceLock;

use crate::distribution::ScoreHistogram;
use crate::hardy_weinberg::CommonHarmfulAnalysis;
use crate::threshold::ThresholdScan;
use crate::types::Variant;

pub use crate::config::{PlotConfig, PlotFormat};

const FONT_CANDIDATES: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
];

/// Register a system font for the ab_glyph backend (no-op after first call).
pub fn ensure_fonts() -> Result<()> {
    static FONT_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    FONT_INIT
        .get_or_init(register_fonts)
        .clone()
        .map_err(anyhow::Error::msg)
}

fn register_fonts() -> Result<(), String> {
    let path = FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .ok_or_else(|| format!("no sans-serif font found in {}", FONT_CANDIDATES.join(", ")))?;
    let data = std::fs::read(path)
        .map_err(|e| format!("failed to read font {}: {}", path.display(), e))?;
    // plotters keeps a 'static reference for the life of the process
    let data: &'static [u8] = Box::leak(data.into_boxed_slice());
    for style in [FontStyle::Normal, FontStyle::Bold] {
        plotters::style::register_font("sans-serif", style, data)
            .map_err(|_| format!("failed to register font {}", path.display()))?;
    }
    Ok(())
}

// Palette
pub const COLOR_STEEL_BLUE: RGBColor = RGBColor(46, 134, 171); // #2E86AB
pub const COLOR_MAGENTA: RGBColor = RGBColor(162, 59, 114); // #A23B72
pub const COLOR_ORANGE: RGBColor = RGBColor(241, 143, 1); // #F18F01
pub const COLOR_GRID: RGBColor = RGBColor(200, 200, 200);

/// Open a backend for `config.format`, run the draw call on it and present.
macro_rules! render {
    ($path:expr, $config:expr, |$root:ident| $draw:expr) => {{
        let size = ($config.width, $config.height);
        match $config.format {
            PlotFormat::Png => {
                let $root = BitMapBackend::new($path, size).into_drawing_area();
                $draw?;
                $root.present()?;
            }
            PlotFormat::Svg => {
                let $root = SVGBackend::new($path, size).into_drawing_area();
                $draw?;
                $root.present()?;
            }
        }
        tracing::debug!("plot saved to {}", $path.display());
    }};
}

/// Allele frequency against silva score, log-scaled score axis.
pub fn plot_freq(variants: &[Variant], path: &Path, config: &PlotConfig) -> Result<()> {
    ensure_fonts()?;
    let points: Vec<(f64, f64)> = variants.iter().map(|v| (v.score, v.af)).collect();
    render!(path, config, |root| scatter::draw_freq_scatter(&root, &points));
    Ok(())
}

/// Log-log histogram of scores.
pub fn plot_score_histogram(
    hist: &ScoreHistogram,
    title: &str,
    path: &Path,
    config: &PlotConfig,
) -> Result<()> {
    ensure_fonts()?;
    if hist.edges.len() < 2 {
        anyhow::bail!("No bins to plot");
    }
    render!(path, config, |root| histogram::draw_score_histogram(&root, hist, title));
    Ok(())
}

/// Random-minus-real counts against score threshold.
pub fn plot_threshold_scan(scan: &ThresholdScan, path: &Path, config: &PlotConfig) -> Result<()> {
    ensure_fonts()?;
    if scan.points.is_empty() {
        anyhow::bail!("No data to plot");
    }
    render!(path, config, |root| scatter::draw_threshold_scan(&root, scan));
    Ok(())
}

/// Chi-square statistic against silva score for tested common harmful variants.
pub fn plot_chisq_vs_score(
    analysis: &CommonHarmfulAnalysis,
    path: &Path,
    config: &PlotConfig,
) -> Result<()> {
    ensure_fonts()?;
    let points: Vec<(f64, f64)> = analysis
        .tested
        .iter()
        .map(|t| (t.score, t.result.chi_square))
        .collect();
    render!(path, config, |root| scatter::draw_chisq_vs_score(&root, &points));
    Ok(())
}

/// Fraction deviating from Hardy-Weinberg against score cutoff.
pub fn plot_percent_vs_cutoff(
    analysis: &CommonHarmfulAnalysis,
    path: &Path,
    config: &PlotConfig,
) -> Result<()> {
    ensure_fonts()?;
    let points: Vec<(f64, f64)> = analysis
        .curve
        .iter()
        .map(|p| (p.cutoff, p.fraction()))
        .collect();
    render!(path, config, |root| scatter::draw_percent_vs_cutoff(&root, &points));
    Ok(())
}
