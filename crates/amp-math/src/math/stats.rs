//! Summary statistics and standardization.
//!
//! Standard deviations are population (ddof = 0) estimates. Standardizing a
//! constant vector yields zeros rather than NaN, so a degenerate column or a
//! single-sample group contributes nothing instead of poisoning every score.

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Returns NaN for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mu = mean(values);
    let var = values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Z-score a vector: subtract the mean, divide by the population std.
///
/// A zero (or non-finite) spread maps every entry to 0.
pub fn zscore(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mu = mean(values);
    let sd = population_std(values);
    if sd == 0.0 || !sd.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mu) / sd).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn mean_and_std_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(mean(&v), 5.0, 1e-12));
        assert!(approx_eq(population_std(&v), 2.0, 1e-12));
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn zscore_has_zero_mean_unit_std() {
        let z = zscore(&[1.0, 2.0, 3.0, 4.0, 10.0]);
        assert!(approx_eq(mean(&z), 0.0, 1e-12));
        assert!(approx_eq(population_std(&z), 1.0, 1e-12));
    }

    #[test]
    fn zscore_constant_is_zero() {
        assert_eq!(zscore(&[3.0, 3.0, 3.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(zscore(&[7.5]), vec![0.0]);
        assert!(zscore(&[]).is_empty());
    }
}
