//! Sample statistics used by the correlation operators.
//!
//! The only statistic the pipeline computes is the sample Pearson
//! correlation coefficient between two equal-length windows. Degenerate
//! windows (empty, or with numerically zero variance on either side)
//! produce `NaN`, which flows downstream as an ordinary value.

/// Pearson correlation coefficient between two equal-length slices.
///
/// Returns `NaN` when the slices are empty or when either side has
/// numerically zero variance. The coefficient of a constant series is
/// undefined, and the pipeline propagates that rather than substituting
/// a sentinel.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "correlation windows must match");
    if a.is_empty() {
        return f64::NAN;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..a.len() {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < 1e-12 { f64::NAN } else { cov / denom }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::statistics::Statistics;

    fn seeded_series(n: usize, seed: u64) -> Vec<f64> {
        let mut data = Vec::with_capacity(n);
        let mut state: u64 = seed;
        for _ in 0..n {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            data.push((state >> 11) as f64 / (1u64 << 53) as f64 * 100.0);
        }
        data
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&a, &b) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient_within_unit_interval() {
        let a = seeded_series(500, 0xdeadbeef);
        let b = seeded_series(500, 0xcafebabe);
        let r = pearson(&a, &b);
        assert!(r.is_finite());
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_zero_variance_is_nan() {
        let a = [5.0, 5.0, 5.0, 5.0];
        let b = [1.0, 2.0, 3.0, 4.0];
        assert!(pearson(&a, &b).is_nan());
        assert!(pearson(&b, &a).is_nan());
    }

    #[test]
    fn test_empty_window_is_nan() {
        assert!(pearson(&[], &[]).is_nan());
    }

    #[test]
    fn test_matches_statrs_covariance_formula() {
        let a = seeded_series(200, 42);
        let b: Vec<f64> = a
            .iter()
            .zip(seeded_series(200, 43))
            .map(|(x, noise)| 0.7 * x + 0.3 * noise)
            .collect();

        // r = cov(a, b) / (sd(a) * sd(b)); the sample scaling factors cancel.
        let expected =
            (&a).covariance(&b) / ((&a).std_dev() * (&b).std_dev());
        let got = pearson(&a, &b);
        assert!((got - expected).abs() < 1e-10);
        assert!(got > 0.5, "construction guarantees strong correlation");
    }
}
