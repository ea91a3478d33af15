use crate::error::StatsError;
use crate::types::TTestResult;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample("mean"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance (n - 1 denominator)
pub fn sample_variance(values: &[f64]) -> Result<f64, StatsError> {
    if values.len() < 2 {
        return Err(StatsError::InsufficientSamples {
            needed: 2,
            found: values.len(),
        });
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    Ok(ss / (values.len() - 1) as f64)
}

/// Welch's unequal-variance two-sample t-test
///
/// Degrees of freedom follow the Welch-Satterthwaite equation:
///   df = (va/na + vb/nb)^2 / ((va/na)^2/(na-1) + (vb/nb)^2/(nb-1))
///
/// Returns: t-statistic and two-sided p-value from Student's t
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TTestResult, StatsError> {
    let var_a = sample_variance(a)?;
    let var_b = sample_variance(b)?;
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let na = a.len() as f64;
    let nb = b.len() as f64;
    let se_a = var_a / na;
    let se_b = var_b / nb;
    let se_sum = se_a + se_b;

    if se_sum == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let t = (mean_a - mean_b) / se_sum.sqrt();
    let df = se_sum * se_sum / (se_a * se_a / (na - 1.0) + se_b * se_b / (nb - 1.0));

    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = (2.0 * dist.sf(t.abs())).min(1.0);

    Ok(TTestResult {
        mean_a,
        mean_b,
        var_a,
        var_b,
        t,
        df,
        p_value,
    })
}
