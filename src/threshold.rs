use crate::error::StatsError;
use crate::types::{ThresholdPoint, Variant};
use rayon::prelude::*;

/// Log10 of the lowest and highest scanned threshold.
const LOG_LOW: f64 = -3.0;
const LOG_HIGH: f64 = -1.0;

/// `intervals` log-spaced thresholds from 1e-3 to 1e-1 inclusive.
///
/// The count must be odd so that 1e-2 is one of the thresholds.
pub fn log_thresholds(intervals: usize) -> Result<Vec<f64>, StatsError> {
    if intervals < 3 || intervals % 2 == 0 {
        return Err(StatsError::InvalidIntervalCount(intervals));
    }
    let step = (LOG_HIGH - LOG_LOW) / (intervals - 1) as f64;
    Ok((0..intervals)
        .map(|i| 10f64.powf(LOG_LOW + i as f64 * step))
        .collect())
}

/// Per-threshold counts of real and random variants scoring above each threshold.
#[derive(Debug, Clone)]
pub struct ThresholdScan {
    pub points: Vec<ThresholdPoint>,
    pub total_real: usize,
}

impl ThresholdScan {
    /// First point with the largest random-minus-real difference.
    pub fn maximum(&self) -> Option<&ThresholdPoint> {
        self.points.iter().fold(None, |best: Option<&ThresholdPoint>, p| match best {
            Some(b) if b.difference() >= p.difference() => Some(b),
            _ => Some(p),
        })
    }

    /// Max difference as a fraction of real variants above the max threshold.
    pub fn rejection_at_max(&self) -> Result<f64, StatsError> {
        let max = self
            .maximum()
            .ok_or(StatsError::EmptySample("threshold scan"))?;
        if max.real_count == 0 {
            return Err(StatsError::EmptySample("rejection rate at max threshold"));
        }
        Ok(max.difference() as f64 / max.real_count as f64)
    }

    /// Max difference as a fraction of all real variants.
    pub fn overall_rejection(&self) -> Result<f64, StatsError> {
        let max = self
            .maximum()
            .ok_or(StatsError::EmptySample("threshold scan"))?;
        if self.total_real == 0 {
            return Err(StatsError::EmptySample("overall rejection rate"));
        }
        Ok(max.difference() as f64 / self.total_real as f64)
    }
}

fn count_above(variants: &[Variant], threshold: f64) -> u64 {
    variants.iter().filter(|v| v.score > threshold).count() as u64
}

/// Count variants in each set scoring above every threshold.
pub fn threshold_scan(
    real: &[Variant],
    random: &[Variant],
    intervals: usize,
) -> Result<ThresholdScan, StatsError> {
    let thresholds = log_thresholds(intervals)?;

    let points = thresholds
        .par_iter()
        .map(|&threshold| ThresholdPoint {
            threshold,
            real_count: count_above(real, threshold),
            random_count: count_above(random, threshold),
        })
        .collect();

    Ok(ThresholdScan {
        points,
        total_real: real.len(),
    })
}
