// ── Quantile helpers ──────────────────────────────────────────────────────────

/// Compute the `q`-quantile (`0.0..=1.0`) of a **sorted** slice using linear
/// interpolation between order statistics (NumPy's default `quantile`).
///
/// Returns `None` for an empty slice; the quantile of nothing is undefined.
pub fn quantile_sorted(sorted_data: &[f64], q: f64) -> Option<f64> {
    let len = sorted_data.len();
    if len == 0 {
        return None;
    }
    if len == 1 {
        return Some(sorted_data[0]);
    }
    let rank = q.clamp(0.0, 1.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted_data[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
}

/// Sort a copy of `data` and take several quantiles at once.
///
/// The result does not depend on the input order.
pub fn quantiles(data: &[f64], qs: &[f64]) -> Option<Vec<f64>> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    qs.iter().map(|&q| quantile_sorted(&sorted, q)).collect()
}

/// Median of an unsorted slice.
pub fn median(data: &[f64]) -> Option<f64> {
    quantiles(data, &[0.5]).map(|v| v[0])
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_empty_is_none() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantiles(&[], &[0.25]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_quantile_single_element() {
        assert_eq!(quantile_sorted(&[42.0], 0.9), Some(42.0));
        assert_eq!(quantile_sorted(&[42.0], 0.0), Some(42.0));
    }

    #[test]
    fn test_quantile_median_even_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        // rank = 0.5 * 3 = 1.5 → between 2 and 3
        assert!((quantile_sorted(&data, 0.5).unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_quartiles_of_five() {
        let q = quantiles(&[10.0, 20.0, 30.0, 40.0, 50.0], &[0.25, 0.5, 0.75]).unwrap();
        assert_eq!(q, vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_quartiles_interpolated() {
        // rank(0.25) = 0.75 → 1 + 0.75 * (2 - 1)
        let q = quantiles(&[1.0, 2.0, 3.0, 4.0], &[0.25, 0.75]).unwrap();
        assert!((q[0] - 1.75).abs() < 1e-9);
        assert!((q[1] - 3.25).abs() < 1e-9);
    }

    #[test]
    fn test_quantiles_order_invariant() {
        let sorted = [1.0, 5.0, 7.0, 9.0, 20.0, 33.0];
        let shuffled = [20.0, 1.0, 33.0, 7.0, 9.0, 5.0];
        let qs = [0.25, 0.5, 0.75];
        assert_eq!(quantiles(&sorted, &qs), quantiles(&shuffled, &qs));
    }

    #[test]
    fn test_quartiles_monotone() {
        let data = [3600.0, 28_800.0, 25_200.0, 18_000.0, 30_600.0, 27_000.0, 100.0];
        let q = quantiles(&data, &[0.25, 0.5, 0.75]).unwrap();
        assert!(q[0] <= q[1] && q[1] <= q[2], "{q:?}");
    }

    #[test]
    fn test_quantile_extremes() {
        let data = [10.0, 20.0, 30.0];
        assert_eq!(quantile_sorted(&data, 0.0), Some(10.0));
        assert_eq!(quantile_sorted(&data, 1.0), Some(30.0));
    }

    #[test]
    fn test_median_odd() {
        assert_eq!(median(&[9.0, 1.0, 5.0]), Some(5.0));
    }
}
