use crate::types::Variant;

/// Allele frequency band used to split score distributions. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    pub min_af: f64,
    pub max_af: f64,
    /// File name fragment, e.g. "0-0.01freq"
    pub label: &'static str,
}

impl FrequencyBand {
    pub fn contains(&self, af: f64) -> bool {
        af > self.min_af && af < self.max_af
    }
}

/// All, very rare, medium rare and common variants.
pub const FREQUENCY_BANDS: [FrequencyBand; 4] = [
    FrequencyBand { min_af: 0.0, max_af: 1.0, label: "allfreq" },
    FrequencyBand { min_af: 0.0, max_af: 0.01, label: "0-0.01freq" },
    FrequencyBand { min_af: 0.01, max_af: 0.05, label: "0.01-0.05freq" },
    FrequencyBand { min_af: 0.05, max_af: 1.0, label: "0.05-1freq" },
];

/// `n` log-spaced edges from `lo` to `hi` inclusive.
pub fn log_bins(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let (a, b) = (lo.log10(), hi.log10());
            let step = (b - a) / (n - 1) as f64;
            (0..n).map(|i| 10f64.powf(a + i as f64 * step)).collect()
        }
    }
}

/// Histogram of scores over fixed bin edges.
///
/// Bins are half-open `[e_i, e_i+1)` except the last, which also includes its
/// upper edge. Values outside the edges are not counted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl ScoreHistogram {
    pub fn build(scores: impl IntoIterator<Item = f64>, edges: Vec<f64>) -> Self {
        let n_bins = edges.len().saturating_sub(1);
        let mut counts = vec![0u64; n_bins];
        if n_bins > 0 {
            let last = edges[n_bins];
            for s in scores {
                if s < edges[0] || s > last || s.is_nan() {
                    continue;
                }
                // index of the first edge strictly greater than s, minus one
                let idx = edges.partition_point(|&e| e <= s).saturating_sub(1);
                counts[idx.min(n_bins - 1)] += 1;
            }
        }
        Self { edges, counts }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// (lower, upper, count) for each bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(w, &c)| (w[0], w[1], c))
    }
}

/// Score histogram of the variants within one frequency band, optionally
/// dropping scores at or below `score_floor`.
pub fn band_histogram(
    variants: &[Variant],
    band: &FrequencyBand,
    score_floor: Option<f64>,
    edges: Vec<f64>,
) -> ScoreHistogram {
    let scores = variants
        .iter()
        .filter(|v| band.contains(v.af))
        .filter(|v| score_floor.map_or(true, |floor| v.score > floor))
        .map(|v| v.score);
    ScoreHistogram::build(scores, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn with(score: f64, af: f64) -> Variant {
        Variant {
            rank: 0.0,
            score,
            class: String::new(),
            gene: String::new(),
            transcript: String::new(),
            chrom: "1".to_string(),
            pos: "1".to_string(),
            id: String::new(),
            ref_allele: "A".to_string(),
            alt_allele: "T".to_string(),
            af,
            info: String::new(),
            ac_het: 0,
            ac_hom: 0,
            an: 100,
            multiallelic: false,
        }
    }

    #[test]
    fn test_log_bins() {
        let edges = log_bins(0.001, 1.0, 4);
        assert_eq!(edges.len(), 4);
        assert_relative_eq!(edges[0], 0.001, epsilon = 1e-15);
        assert_relative_eq!(edges[1], 0.01, epsilon = 1e-14);
        assert_relative_eq!(edges[2], 0.1, epsilon = 1e-13);
        assert_relative_eq!(edges[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_histogram_edges_semantics() {
        let edges = vec![0.0, 1.0, 2.0, 3.0];
        let h = ScoreHistogram::build([0.0, 0.5, 1.0, 2.5, 3.0, 3.5, -1.0], edges);
        // 1.0 opens the second bin, 3.0 closes the last, 3.5 and -1.0 are outside
        assert_eq!(h.counts, vec![2, 1, 2]);
        assert_eq!(h.total(), 5);
        let bins: Vec<_> = h.bins().collect();
        assert_eq!(bins[1], (1.0, 2.0, 1));
    }

    #[test]
    fn test_band_bounds_are_exclusive() {
        let band = FREQUENCY_BANDS[2];
        assert!(!band.contains(0.01));
        assert!(band.contains(0.02));
        assert!(!band.contains(0.05));
    }

    #[test]
    fn test_band_histogram_with_floor() {
        let variants = vec![with(0.005, 0.02), with(0.5, 0.02), with(0.5, 0.5)];
        let edges = log_bins(0.001, 1.0, 20);
        let band = FREQUENCY_BANDS[2];
        assert_eq!(band_histogram(&variants, &band, None, edges.clone()).total(), 2);
        assert_eq!(band_histogram(&variants, &band, Some(0.01), edges).total(), 1);
    }
}
