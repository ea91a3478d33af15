/// One scored variant from a silva results file
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub rank: f64,
    pub score: f64,
    pub class: String,
    pub gene: String,
    pub transcript: String,
    pub chrom: String,
    pub pos: String,
    pub id: String,
    pub ref_allele: String,
    pub alt_allele: String,

    /// Allele frequency derived as 2 * AC_Adj / AN
    pub af: f64,
    pub info: String,

    // Genotype counts from the info column
    pub ac_het: u64,
    pub ac_hom: u64,
    pub an: u64,

    /// AF listed more than one alternate allele
    pub multiallelic: bool,
}

/// Per-file counters collected while parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub data_lines: u64,
    pub comment_lines: u64,
    pub missing_info: u64,
    pub zero_allele_number: u64,
    pub multiallelic: u64,
}

impl ParseSummary {
    pub fn skipped(&self) -> u64 {
        self.missing_info + self.zero_allele_number
    }
}

/// Variants loaded from one file, in file order
#[derive(Debug, Clone, Default)]
pub struct LoadedVariants {
    pub variants: Vec<Variant>,
    pub summary: ParseSummary,
}

/// Welch's unequal-variance t-test
#[derive(Debug, Clone, PartialEq)]
pub struct TTestResult {
    pub mean_a: f64,
    pub mean_b: f64,
    pub var_a: f64,
    pub var_b: f64,
    pub t: f64,
    pub df: f64,
    pub p_value: f64, // two-sided
}

/// Pearson chi-square test against Hardy-Weinberg genotype counts
#[derive(Debug, Clone, PartialEq)]
pub struct HardyWeinbergResult {
    /// hom, het, remainder
    pub expected: [f64; 3],
    pub observed: [f64; 3],
    pub chi_square: f64,
    pub p_value: f64,
}

/// Counts of variants scoring above one threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPoint {
    pub threshold: f64,
    pub real_count: u64,
    pub random_count: u64,
}

impl ThresholdPoint {
    /// Random minus real count
    pub fn difference(&self) -> i64 {
        self.random_count as i64 - self.real_count as i64
    }
}

/// Mean and unbiased variance of one feature column
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub name: String,
    pub mean: f64,
    pub variance: f64,
}
