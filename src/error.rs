use std::io;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Numeric preconditions that a statistical routine could not satisfy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("cannot compute {0} of an empty sample")]
    EmptySample(&'static str),
    #[error("need at least {needed} values, found {found}")]
    InsufficientSamples { needed: usize, found: usize },
    #[error("both samples have zero variance; t-statistic is undefined")]
    ZeroVariance,
    #[error("expected genotype count is zero; chi-square is undefined")]
    ZeroExpectedCount,
    #[error("allele frequency {0} is outside [0, 1]")]
    InvalidFrequency(f64),
    #[error("interval count must be odd and at least 3, got {0}")]
    InvalidIntervalCount(usize),
    #[error("invalid distribution parameters: {0}")]
    Distribution(String),
}

/// Fatal error while reading a results file.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: u64,
    pub raw: String,
    #[source]
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("expected at least {expected} whitespace-delimited fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid {field}: {source}")]
    InvalidFloat {
        field: &'static str,
        #[source]
        source: ParseFloatError,
    },
    #[error("invalid {key} count '{value}': {source}")]
    InvalidCount {
        key: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Errors from the feature matrix reader.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("no header line found")]
    EmptyInput,
    #[error("line {0}: data row appears before the header")]
    MissingHeader(u64),
    #[error("line {0}: header repeated after data rows")]
    LateHeader(u64),
    #[error("line {line}: expected {expected} values, found {found}")]
    RowLength {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid value '{value}'")]
    InvalidValue { line: u64, value: String },
    #[error("need at least 2 data rows to estimate variance, found {0}")]
    InsufficientRows(u64),
}
