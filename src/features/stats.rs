//! Row-wise summary statistics across a set of condition columns.

/// Summary of one subject's values across several columns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowSummary {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for fewer than two values.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl RowSummary {
    /// Compute the summary of a slice of values.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std_dev: sample_std(values, mean),
            min,
            max,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (m2 / (values.len() - 1) as f64).sqrt()
}

/// Sample standard deviation of `values`.
pub fn std_dev(values: &[f64]) -> f64 {
    RowSummary::compute(values).std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_range_std() {
        let s = RowSummary::compute(&[10.0, 12.0, 14.0]);
        assert!((s.mean - 12.0).abs() < 1e-12);
        assert!((s.range() - 4.0).abs() < 1e-12);
        // sample variance = (4 + 0 + 4) / 2 = 4
        assert!((s.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_has_undefined_std() {
        let s = RowSummary::compute(&[5.0]);
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.range(), 0.0);
        assert!(s.std_dev.is_nan());
    }

    #[test]
    fn test_empty_values() {
        let s = RowSummary::compute(&[]);
        assert!(s.mean.is_nan());
        assert!(std_dev(&[]).is_nan());
    }

    #[test]
    fn test_constant_values() {
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
    }
}
