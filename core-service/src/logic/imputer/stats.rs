//! Column statistics used to pick fill values.

use std::cmp::Ordering;
use std::collections::HashMap;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Some(sorted[n / 2])
    }
}

/// Sample skewness g1 = m3 / m2^1.5.
/// Fewer than 3 values or zero variance reads as unskewed.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }

    let mu = values.iter().sum::<f64>() / n as f64;
    let m2 = values.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / n as f64;
    if m2 <= f64::EPSILON {
        return 0.0;
    }
    let m3 = values.iter().map(|x| (x - mu).powi(3)).sum::<f64>() / n as f64;

    m3 / m2.powf(1.5)
}

/// Most frequent value; ties go to the lexicographically smallest
pub fn most_frequent<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(v, _)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_median() {
        assert_eq!(mean(&[10.0, 20.0]), Some(15.0));
        assert_eq!(median(&[10.0, 20.0]), Some(15.0));
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).abs() < 1e-12);
        assert_eq!(skewness(&[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(skewness(&[1.0, 100.0]), 0.0);
    }

    #[test]
    fn test_skewness_long_right_tail() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 50.0];
        assert!(skewness(&values) > 1.0);
    }

    #[test]
    fn test_most_frequent_tie_break() {
        assert_eq!(most_frequent(["b", "a", "b", "a"]), Some("a".to_string()));
        assert_eq!(most_frequent(["x", "y", "y"]), Some("y".to_string()));
        assert_eq!(most_frequent(std::iter::empty()), None);
    }
}
