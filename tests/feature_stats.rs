use std::fs::{self, File};
use std::io::BufReader;

use approx::assert_relative_eq;
use silva_compare::error::FeatureError;
use silva_compare::feature_stats::{format_summary, read_feature_matrix};
use tempfile::tempdir;

#[test]
fn summarizes_matrix_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("control.mat");
    fs::write(
        &path,
        "#gc #cpg #class\n\
         0.40 2 0\n\
         0.50 4 1\n\
         \n\
         0.60 6 0\n",
    )
    .unwrap();

    let matrix = read_feature_matrix(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(matrix.rows(), 3);

    let summaries = matrix.summaries().unwrap();
    let lines: Vec<String> = summaries.iter().map(format_summary).collect();
    assert_eq!(lines, vec!["gc\t0.5000\t0.0100", "cpg\t4.0000\t4.0000"]);
    assert_relative_eq!(summaries[0].variance, 0.01, epsilon = 1e-12);
}

#[test]
fn ragged_row_reports_line_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ragged.mat");
    fs::write(&path, "#a #b\n1 2\n3\n").unwrap();

    let err = read_feature_matrix(BufReader::new(File::open(&path).unwrap())).unwrap_err();
    assert!(matches!(
        err,
        FeatureError::RowLength {
            line: 3,
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn non_numeric_cell_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.mat");
    fs::write(&path, "#a\n1\nNA?\n").unwrap();

    let err = read_feature_matrix(BufReader::new(File::open(&path).unwrap())).unwrap_err();
    assert!(matches!(err, FeatureError::InvalidValue { line: 3, .. }));
}
