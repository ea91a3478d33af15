use crate::config::AnalysisConfig;
use crate::error::StatsError;
use crate::types::{HardyWeinbergResult, Variant};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Pearson chi-square test of a variant's genotype counts against Hardy-Weinberg
/// equilibrium, with 1 degree of freedom.
///
/// With p = af, q = 1 - p and n = AN, expected counts are p²n, 2pqn and q²n,
/// compared against AC_Hom, AC_Het and the remainder n - AC_Hom - AC_Het.
/// A frequency outside [0, 1] (AC_Adj above AN / 2) is rejected.
pub fn hardy_weinberg_test(variant: &Variant) -> Result<HardyWeinbergResult, StatsError> {
    let p = variant.af;
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidFrequency(p));
    }
    let q = 1.0 - p;
    let n = variant.an as f64;

    let expected = [p * p * n, 2.0 * p * q * n, q * q * n];
    let observed = [
        variant.ac_hom as f64,
        variant.ac_het as f64,
        n - variant.ac_hom as f64 - variant.ac_het as f64,
    ];

    if expected.iter().any(|&e| e == 0.0) {
        return Err(StatsError::ZeroExpectedCount);
    }

    let chi_square: f64 = observed
        .iter()
        .zip(expected.iter())
        .map(|(o, e)| (o - e) * (o - e) / e)
        .sum();

    let dist = ChiSquared::new(1.0).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = dist.sf(chi_square).clamp(0.0, 1.0);

    Ok(HardyWeinbergResult {
        expected,
        observed,
        chi_square,
        p_value,
    })
}

/// One tested common, harmful variant
#[derive(Debug, Clone)]
pub struct TestedVariant {
    pub score: f64,
    pub af: f64,
    pub result: HardyWeinbergResult,
}

/// Fraction of tested variants deviating from HW among those above a score cutoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffPoint {
    pub cutoff: f64,
    pub above: usize,
    pub deviating: usize,
}

impl CutoffPoint {
    pub fn fraction(&self) -> f64 {
        self.deviating as f64 / self.above as f64
    }
}

#[derive(Debug, Clone)]
pub struct CommonHarmfulAnalysis {
    /// Variants passing the score and frequency filters
    pub candidates: usize,
    /// Candidates whose expected counts were all non-zero
    pub tested: Vec<TestedVariant>,
    pub deviating: usize,
    pub curve: Vec<CutoffPoint>,
}

impl CommonHarmfulAnalysis {
    pub fn excluded(&self) -> usize {
        self.candidates - self.tested.len()
    }

    pub fn deviation_fraction(&self) -> f64 {
        self.deviating as f64 / self.tested.len() as f64
    }
}

/// Score cutoffs for the deviation curve: 0.05, 0.10, ..., 0.95
pub fn cutoff_steps() -> impl Iterator<Item = f64> {
    (1..20).map(|k| 0.05 * k as f64)
}

/// Test every variant above both the harmful-score and common-frequency thresholds
/// for departure from Hardy-Weinberg equilibrium.
pub fn common_harmful_analysis(
    variants: &[Variant],
    config: &AnalysisConfig,
) -> Result<CommonHarmfulAnalysis, StatsError> {
    let candidates: Vec<&Variant> = variants
        .iter()
        .filter(|v| v.score > config.harmful_threshold && v.af > config.common_threshold)
        .collect();

    let mut tested = Vec::with_capacity(candidates.len());
    for v in &candidates {
        match hardy_weinberg_test(v) {
            Ok(result) => tested.push(TestedVariant {
                score: v.score,
                af: v.af,
                result,
            }),
            Err(e) => {
                tracing::debug!("skipping HW test for {}:{} ({})", v.chrom, v.pos, e);
            }
        }
    }

    if tested.is_empty() {
        return Err(StatsError::EmptySample("Hardy-Weinberg deviation rate"));
    }

    let alpha = config.hw_alpha;
    let deviating = tested.iter().filter(|t| t.result.p_value < alpha).count();

    let curve = cutoff_steps()
        .filter_map(|cutoff| {
            let above = tested.iter().filter(|t| t.score > cutoff).count();
            if above == 0 {
                return None;
            }
            let deviating = tested
                .iter()
                .filter(|t| t.score > cutoff && t.result.p_value < alpha)
                .count();
            Some(CutoffPoint {
                cutoff,
                above,
                deviating,
            })
        })
        .collect();

    Ok(CommonHarmfulAnalysis {
        candidates: candidates.len(),
        tested,
        deviating,
        curve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn variant(score: f64, af: f64, ac_hom: u64, ac_het: u64, an: u64) -> Variant {
        Variant {
            rank: 1.0,
            score,
            class: "syn".to_string(),
            gene: "G".to_string(),
            transcript: "T".to_string(),
            chrom: "1".to_string(),
            pos: "100".to_string(),
            id: ".".to_string(),
            ref_allele: "A".to_string(),
            alt_allele: "C".to_string(),
            af,
            info: String::new(),
            ac_het,
            ac_hom,
            an,
            multiallelic: false,
        }
    }

    #[test]
    fn test_equilibrium_gives_zero_chi() {
        // p = 0.2, n = 100: expected 4, 32, 64
        let v = variant(0.5, 0.2, 4, 32, 100);
        let r = hardy_weinberg_test(&v).unwrap();
        assert_relative_eq!(r.chi_square, 0.0, epsilon = 1e-9);
        assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-9);
        assert_relative_eq!(r.expected[1], 32.0, epsilon = 1e-9);
        assert_relative_eq!(r.observed[2], 64.0, epsilon = 1e-9);
    }

    #[test]
    fn test_deviation_detected() {
        // p = 0.5, n = 100: expected 25, 50, 25; observed 50, 0, 50
        let v = variant(0.5, 0.5, 50, 0, 100);
        let r = hardy_weinberg_test(&v).unwrap();
        assert_relative_eq!(r.chi_square, 100.0, epsilon = 1e-9);
        assert!(r.p_value < 1e-10);
    }

    #[test]
    fn test_chi_critical_value() {
        // p = 0.5, n = 100: expected 25, 50, 25; observed 30, 40, 30
        // chi = 1 + 2 + 1 = 4, sf(4; 1) = erfc(sqrt(2))
        let v = variant(0.5, 0.5, 30, 40, 100);
        let r = hardy_weinberg_test(&v).unwrap();
        assert_relative_eq!(r.chi_square, 4.0, epsilon = 1e-9);
        assert_relative_eq!(r.p_value, 0.0455003, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_expected_is_undefined() {
        let v = variant(0.5, 0.0, 0, 0, 100);
        assert_eq!(hardy_weinberg_test(&v), Err(StatsError::ZeroExpectedCount));
        let v = variant(0.5, 1.0, 100, 0, 100);
        assert_eq!(hardy_weinberg_test(&v), Err(StatsError::ZeroExpectedCount));
    }

    #[test]
    fn test_frequency_above_one_is_rejected() {
        // AC_Adj = 60, AN = 100 gives af = 1.2 and a negative expected het count
        let v = variant(0.5, 1.2, 50, 10, 100);
        assert_eq!(hardy_weinberg_test(&v), Err(StatsError::InvalidFrequency(1.2)));
    }

    #[test]
    fn test_out_of_range_frequency_not_counted_as_deviating() {
        let config = AnalysisConfig::default();
        let variants = vec![
            variant(0.5, 0.2, 4, 32, 100),
            variant(0.9, 1.2, 50, 10, 100),
        ];
        let analysis = common_harmful_analysis(&variants, &config).unwrap();
        assert_eq!(analysis.candidates, 2);
        assert_eq!(analysis.tested.len(), 1);
        assert_eq!(analysis.excluded(), 1);
        assert_eq!(analysis.deviating, 0);
    }

    #[test]
    fn test_common_harmful_filters_and_excludes() {
        let config = AnalysisConfig::default();
        let variants = vec![
            variant(0.5, 0.2, 4, 32, 100),  // in equilibrium
            variant(0.9, 0.5, 50, 0, 100),  // deviates
            variant(0.01, 0.5, 50, 0, 100), // not harmful
            variant(0.9, 0.01, 0, 1, 100),  // not common
            variant(0.9, 1.0, 100, 0, 100), // undefined, excluded
        ];
        let analysis = common_harmful_analysis(&variants, &config).unwrap();
        assert_eq!(analysis.candidates, 3);
        assert_eq!(analysis.tested.len(), 2);
        assert_eq!(analysis.excluded(), 1);
        assert_eq!(analysis.deviating, 1);
        assert_relative_eq!(analysis.deviation_fraction(), 0.5);

        // 0.05..0.45 see both variants, 0.50..0.85 only the deviating one
        let first = analysis.curve[0];
        assert_eq!((first.above, first.deviating), (2, 1));
        let at_half = analysis
            .curve
            .iter()
            .find(|p| (p.cutoff - 0.5).abs() < 1e-9)
            .unwrap();
        assert_eq!((at_half.above, at_half.deviating), (1, 1));
        assert_relative_eq!(at_half.fraction(), 1.0);
        assert!(analysis.curve.iter().all(|p| p.cutoff < 0.9));
    }

    #[test]
    fn test_common_harmful_empty() {
        let config = AnalysisConfig::default();
        let variants = vec![variant(0.01, 0.5, 50, 0, 100)];
        assert!(matches!(
            common_harmful_analysis(&variants, &config),
            Err(StatsError::EmptySample(_))
        ));
    }
}
