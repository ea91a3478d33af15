use anyhow::Result;
use plotters::prelude::*;

use super::{COLOR_GRID, COLOR_MAGENTA, COLOR_ORANGE, COLOR_STEEL_BLUE};
use crate::threshold::ThresholdScan;

const SCORE_MIN: f64 = 0.001;
const SCORE_MAX: f64 = 1.0;

/// (min, max) of a series padded by 5%, falling back to `default` when empty or flat.
fn padded_range(values: impl Iterator<Item = f64>, default: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return default;
    }
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}

/// Draw allele frequency against score on a log score axis.
pub fn draw_freq_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[(f64, f64)],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption("Allele frequency vs silva score", ("sans-serif", 20).into_font().color(&BLACK))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((SCORE_MIN..SCORE_MAX).log_scale(), 0.0f64..1.0f64)?;

    chart
        .configure_mesh()
        .x_desc("Silva Score")
        .y_desc("Allele Frequency")
        .x_label_style(("sans-serif", 12))
        .y_label_style(("sans-serif", 12))
        .light_line_style(COLOR_GRID.mix(0.3))
        .draw()?;

    // Scores outside the log axis are clipped
    chart.draw_series(
        points
            .iter()
            .filter(|(x, _)| (SCORE_MIN..=SCORE_MAX).contains(x))
            .map(|&(x, y)| Circle::new((x, y), 2, COLOR_STEEL_BLUE.mix(0.6).filled())),
    )?;

    Ok(())
}

/// Draw random-minus-real counts against a log threshold axis.
pub fn draw_threshold_scan<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    scan: &ThresholdScan,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (y_min, y_max) = padded_range(
        scan.points.iter().map(|p| p.difference() as f64),
        (-1.0, 1.0),
    );

    let mut chart = ChartBuilder::on(root)
        .caption("Threshold scan", ("sans-serif", 20).into_font().color(&BLACK))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((10f64.powf(-3.1)..10f64.powf(-0.9)).log_scale(), y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Silva score threshold")
        .y_desc("# more random than real")
        .x_label_style(("sans-serif", 12))
        .y_label_style(("sans-serif", 12))
        .light_line_style(COLOR_GRID.mix(0.3))
        .draw()?;

    chart.draw_series(scan.points.iter().map(|p| {
        Circle::new(
            (p.threshold, p.difference() as f64),
            3,
            COLOR_MAGENTA.mix(0.8).filled(),
        )
    }))?;

    if let Some(max) = scan.maximum() {
        chart.draw_series(std::iter::once(Cross::new(
            (max.threshold, max.difference() as f64),
            6,
            COLOR_ORANGE.stroke_width(2),
        )))?;
    }

    Ok(())
}

/// Draw chi-square statistic against score.
pub fn draw_chisq_vs_score<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[(f64, f64)],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (_, y_max) = padded_range(points.iter().map(|&(_, y)| y), (0.0, 1.0));

    let mut chart = ChartBuilder::on(root)
        .caption("Hardy-Weinberg chi-square vs silva score", ("sans-serif", 20).into_font().color(&BLACK))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Silva Score")
        .y_desc("chi square test statistic")
        .x_label_style(("sans-serif", 12))
        .y_label_style(("sans-serif", 12))
        .light_line_style(COLOR_GRID.mix(0.3))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .filter(|(_, y)| y.is_finite())
            .map(|&(x, y)| Circle::new((x, y), 2, COLOR_STEEL_BLUE.mix(0.6).filled())),
    )?;

    Ok(())
}

/// Draw the fraction of variants out of equilibrium against score cutoff.
pub fn draw_percent_vs_cutoff<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[(f64, f64)],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption("Hardy-Weinberg deviation by score cutoff", ("sans-serif", 20).into_font().color(&BLACK))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("Silva Score cutoff")
        .y_desc("Fraction of common variants deviating from HW")
        .x_label_style(("sans-serif", 12))
        .y_label_style(("sans-serif", 12))
        .light_line_style(COLOR_GRID.mix(0.3))
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        COLOR_STEEL_BLUE.mix(0.7).stroke_width(1),
    ))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, COLOR_MAGENTA.mix(0.8).filled())),
    )?;

    Ok(())
}
