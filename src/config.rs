use anyhow::Result;

/// Output format for plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    Png,
    Svg,
}

impl PlotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "png" => Ok(PlotFormat::Png),
            "svg" => Ok(PlotFormat::Svg),
            other => anyhow::bail!("Invalid plot format '{}'. Must be 'png' or 'svg'", other),
        }
    }
}

/// Configuration for plot generation.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub format: PlotFormat,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: PlotFormat::Png,
        }
    }
}

/// Tunables for one real-vs-random comparison run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Number of log-spaced thresholds between 1e-3 and 1e-1 (odd)
    pub intervals: usize,
    /// Scores above this count as harmful
    pub harmful_threshold: f64,
    /// Allele frequencies above this count as common
    pub common_threshold: f64,
    /// Significance level for the Hardy-Weinberg test
    pub hw_alpha: f64,
    /// Minimum score kept in the "nonzero" histograms
    pub nonzero_floor: f64,
    /// Number of log-spaced histogram bin edges over [1e-3, 1]
    pub histogram_edges: usize,
    /// `None` disables plotting
    pub plots: Option<PlotConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            intervals: 129,
            harmful_threshold: 0.05,
            common_threshold: 0.05,
            hw_alpha: 0.05,
            nonzero_floor: 0.01,
            histogram_edges: 20,
            plots: Some(PlotConfig::default()),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.intervals < 3 || self.intervals % 2 == 0 {
            anyhow::bail!(
                "--intervals must be odd and at least 3, got {}",
                self.intervals
            );
        }
        if self.histogram_edges < 2 {
            anyhow::bail!("histogram needs at least 2 bin edges");
        }
        for (name, value) in [
            ("--harmful-threshold", self.harmful_threshold),
            ("--common-threshold", self.common_threshold),
            ("--hw-alpha", self.hw_alpha),
            ("--nonzero-floor", self.nonzero_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_even_intervals_rejected() {
        let config = AnalysisConfig {
            intervals: 32,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = AnalysisConfig {
            hw_alpha: 1.5,
            ..AnalysisConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--hw-alpha"));
    }

    #[test]
    fn test_plot_format_parse() {
        assert_eq!(PlotFormat::parse("SVG").unwrap(), PlotFormat::Svg);
        assert_eq!(PlotFormat::parse("png").unwrap().extension(), "png");
        assert!(PlotFormat::parse("jpeg").is_err());
    }
}
