use anyhow::Result;
use plotters::prelude::*;

use super::{COLOR_GRID, COLOR_STEEL_BLUE};
use crate::distribution::ScoreHistogram;

// Bars start here on the log count axis so single counts stay visible
const COUNT_FLOOR: f64 = 0.5;

/// Draw a score histogram with log-scaled score and count axes.
pub fn draw_score_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    hist: &ScoreHistogram,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let x_min = hist.edges[0];
    let x_max = hist.edges[hist.edges.len() - 1];
    let max_count = hist.counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20).into_font().color(&BLACK))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_min..x_max).log_scale(),
            (COUNT_FLOOR..max_count * 2.0).log_scale(),
        )?;

    chart
        .configure_mesh()
        .x_desc("Silva Score")
        .y_desc("Variants")
        .x_label_style(("sans-serif", 12))
        .y_label_style(("sans-serif", 12))
        .light_line_style(COLOR_GRID.mix(0.3))
        .draw()?;

    chart.draw_series(hist.bins().filter(|&(_, _, c)| c > 0).map(|(lo, hi, c)| {
        Rectangle::new(
            [(lo, COUNT_FLOOR), (hi, c as f64)],
            COLOR_STEEL_BLUE.mix(0.7).filled(),
        )
    }))?;

    Ok(())
}
