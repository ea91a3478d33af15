use crate::hardy_weinberg::CommonHarmfulAnalysis;
use crate::threshold::ThresholdScan;
use crate::types::TTestResult;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const STATISTICS_FILE: &str = "statistics.txt";

/// Human-readable statistics report, truncated once and appended to per section.
pub struct StatisticsReport {
    path: PathBuf,
}

impl StatisticsReport {
    /// Create (or truncate) `statistics.txt` inside `out_dir`.
    pub fn create(out_dir: &Path) -> Result<Self> {
        let path = out_dir.join(STATISTICS_FILE);
        File::create(&path)
            .with_context(|| format!("Failed to create report: {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append lines; the file is reopened and closed on every call.
    pub fn append<I, S>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open report: {}", self.path.display()))?;
        for line in lines {
            writeln!(file, "{}", line.as_ref())
                .with_context(|| format!("Failed to write report: {}", self.path.display()))?;
        }
        Ok(())
    }
}

pub fn t_test_lines(n_real: usize, n_random: usize, result: &TTestResult) -> Vec<String> {
    vec![
        format!(
            "In total there are {} original variants and {} matched random variants",
            n_real, n_random
        ),
        format!("Mean silva score for real variants: {:.5}", result.mean_a),
        format!("Mean silva score for matched generated variants: {:.5}", result.mean_b),
        format!(
            "p-value and actual t-score based on Welch's t-test: {:.8}, {:.3}",
            result.p_value, result.t
        ),
    ]
}

pub fn threshold_lines(scan: &ThresholdScan) -> Vec<String> {
    let Some(max) = scan.maximum() else {
        return vec!["Threshold scan produced no points.".to_string()];
    };

    let mut lines = vec![format!(
        "The maximum threshold occurs at {:.3}, with {} more random mutations ({}) than true polymorphisms ({}).",
        max.threshold,
        max.difference(),
        max.random_count,
        max.real_count
    )];

    match scan.rejection_at_max() {
        Ok(rate) => lines.push(format!(
            "This suggests a {:.6}% rejection rate at the max threshold.",
            rate * 100.0
        )),
        Err(e) => lines.push(format!("Rejection rate at the max threshold is undefined: {}", e)),
    }

    match scan.overall_rejection() {
        Ok(rate) => lines.push(format!(
            "We estimate a synonymous substitution rejection rate of {:.6}% ({}/{} SNPs).",
            rate * 100.0,
            max.difference(),
            scan.total_real
        )),
        Err(e) => lines.push(format!("Overall rejection rate is undefined: {}", e)),
    }

    lines
}

pub fn hardy_weinberg_lines(analysis: &CommonHarmfulAnalysis) -> Vec<String> {
    let mut lines = vec![format!(
        "{:.6}% of common harmful variants show significant deviations from \
         Hardy-Weinberg equilibrium based on Pearson's chi-square test",
        100.0 * analysis.deviation_fraction()
    )];
    if analysis.excluded() > 0 {
        lines.push(format!(
            "{} of {} common harmful variants were excluded (Hardy-Weinberg test undefined)",
            analysis.excluded(),
            analysis.candidates
        ));
    }
    lines
}

/// Write every threshold point as CSV.
pub fn write_threshold_scan(scan: &ThresholdScan, path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    wtr.write_record(["threshold", "real_count", "random_count", "difference"])?;

    for p in &scan.points {
        wtr.write_record([
            &format!("{:.6e}", p.threshold),
            &p.real_count.to_string(),
            &p.random_count.to_string(),
            &p.difference().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write per-variant Hardy-Weinberg results as CSV.
pub fn write_hw_tests(analysis: &CommonHarmfulAnalysis, path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    wtr.write_record(["score", "af", "chi_square", "p_value"])?;

    for t in &analysis.tested {
        wtr.write_record([
            &format!("{:.6}", t.score),
            &format!("{:.6}", t.af),
            &format!("{:.6}", t.result.chi_square),
            &format!("{:.6e}", t.result.p_value),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ThresholdPoint;
    use tempfile::tempdir;

    fn scan(points: &[(f64, u64, u64)], total_real: usize) -> ThresholdScan {
        ThresholdScan {
            points: points
                .iter()
                .map(|&(threshold, real_count, random_count)| ThresholdPoint {
                    threshold,
                    real_count,
                    random_count,
                })
                .collect(),
            total_real,
        }
    }

    #[test]
    fn test_report_truncates_then_appends() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STATISTICS_FILE), "stale\n").unwrap();

        let report = StatisticsReport::create(dir.path()).unwrap();
        report.append(["first"]).unwrap();
        report.append(vec!["second".to_string(), "third".to_string()]).unwrap();

        let text = std::fs::read_to_string(report.path()).unwrap();
        assert_eq!(text, "first\nsecond\nthird\n");
    }

    #[test]
    fn test_threshold_lines_use_max_point_counts() {
        let s = scan(&[(0.001, 10, 14), (0.01, 4, 6), (0.1, 2, 2)], 20);
        let lines = threshold_lines(&s);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("at 0.001, with 4 more random mutations (14) than true polymorphisms (10)"));
        assert!(lines[1].contains("40.000000% rejection rate"));
        assert!(lines[2].contains("20.000000% (4/20 SNPs)"));
    }

    #[test]
    fn test_threshold_lines_report_undefined_rate() {
        let s = scan(&[(0.001, 0, 3)], 0);
        let lines = threshold_lines(&s);
        assert!(lines[1].starts_with("Rejection rate at the max threshold is undefined"));
        assert!(lines[2].starts_with("Overall rejection rate is undefined"));
    }

    #[test]
    fn test_write_threshold_scan_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.csv");
        write_threshold_scan(&scan(&[(0.001, 3, 5)], 3), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("threshold,real_count,random_count,difference"));
        assert_eq!(lines.next(), Some("1.000000e-3,3,5,2"));
    }
}
