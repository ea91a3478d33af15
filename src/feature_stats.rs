//! Single-pass mean and variance for every column of a numeric feature matrix.
//!
//! The matrix is whitespace-delimited text. A header line starting with `#`
//! names the columns (each token may carry its own `#` prefix); every other
//! non-blank line is one row of floats aligned with the header.

use crate::error::FeatureError;
use crate::types::FeatureSummary;
use std::io::BufRead;

/// Column excluded from the summary output.
pub const CLASS_COLUMN: &str = "class";

/// Running sum and sum of squares for one named feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAccumulator {
    pub name: String,
    pub sum: f64,
    pub sum_sq: f64,
}

impl FeatureAccumulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    pub fn push(&mut self, x: f64) {
        self.sum += x;
        self.sum_sq += x * x;
    }

    /// Mean and unbiased variance over `n` observations.
    pub fn summarize(&self, n: u64) -> Result<FeatureSummary, FeatureError> {
        if n <= 1 {
            return Err(FeatureError::InsufficientRows(n));
        }
        let n_f = n as f64;
        let mean = self.sum / n_f;
        let variance = (n_f / (n_f - 1.0)) * (self.sum_sq / n_f - mean * mean);
        Ok(FeatureSummary {
            name: self.name.clone(),
            mean,
            variance,
        })
    }
}

/// Accumulators for every column, sharing one row count.
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
    accumulators: Vec<FeatureAccumulator>,
    rows: u64,
}

impl FeatureMatrix {
    /// Build accumulators from a header line such as `#gc #cpg #class`.
    pub fn from_header(line: &str) -> Self {
        let accumulators = line
            .split_whitespace()
            .map(|token| token.trim_matches('#'))
            .filter(|name| !name.is_empty())
            .map(FeatureAccumulator::new)
            .collect();
        Self {
            accumulators,
            rows: 0,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accumulators.iter().map(|a| a.name.as_str())
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Add one row to every column. `line` is only used for error reporting.
    pub fn push_row(&mut self, values: &[f64], line: u64) -> Result<(), FeatureError> {
        if values.len() != self.accumulators.len() {
            return Err(FeatureError::RowLength {
                line,
                expected: self.accumulators.len(),
                found: values.len(),
            });
        }
        for (acc, &x) in self.accumulators.iter_mut().zip(values) {
            acc.push(x);
        }
        self.rows += 1;
        Ok(())
    }

    /// Summaries for every feature except `class`, in header order.
    pub fn summaries(&self) -> Result<Vec<FeatureSummary>, FeatureError> {
        if self.rows <= 1 {
            return Err(FeatureError::InsufficientRows(self.rows));
        }
        self.accumulators
            .iter()
            .filter(|a| a.name != CLASS_COLUMN)
            .map(|a| a.summarize(self.rows))
            .collect()
    }
}

/// Stream a feature matrix, keeping only per-column sums in memory.
pub fn read_feature_matrix<R: BufRead>(reader: R) -> Result<FeatureMatrix, FeatureError> {
    let mut matrix: Option<FeatureMatrix> = None;
    let mut values = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('#') {
            if matrix.as_ref().is_some_and(|m| m.rows() > 0) {
                return Err(FeatureError::LateHeader(line_no));
            }
            matrix = Some(FeatureMatrix::from_header(trimmed));
            continue;
        }

        let m = matrix
            .as_mut()
            .ok_or(FeatureError::MissingHeader(line_no))?;

        values.clear();
        for token in trimmed.split_whitespace() {
            let x = token.parse::<f64>().map_err(|_| FeatureError::InvalidValue {
                line: line_no,
                value: token.to_string(),
            })?;
            values.push(x);
        }
        m.push_row(&values, line_no)?;
    }

    matrix.ok_or(FeatureError::EmptyInput)
}

/// `name<TAB>mean<TAB>variance` with four decimals.
pub fn format_summary(s: &FeatureSummary) -> String {
    format!("{}\t{:.4}\t{:.4}", s.name, s.mean, s.variance)
}
