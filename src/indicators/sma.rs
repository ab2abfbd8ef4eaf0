// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_{t-period+1} + ... + close_t) / period
//
// Computed with a running sum so the whole series costs O(n).
// =============================================================================

/// Compute the SMA series for `values` over `period`.
///
/// Output element `i` is the mean of `values[i..i + period]`.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    let mut result = Vec::with_capacity(values.len() - period + 1);

    let mut sum: f64 = values[..period].iter().sum();
    result.push(sum / period_f);

    for i in period..values.len() {
        sum += values[i] - values[i - period];
        result.push(sum / period_f);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_and_zero_period() {
        assert!(calculate_sma(&[], 3).is_empty());
        assert!(calculate_sma(&[1.0, 2.0], 0).is_empty());
        assert!(calculate_sma(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn sma_known_values() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(sma.len(), 3);
        assert!((sma[0] - 2.0).abs() < 1e-12);
        assert!((sma[1] - 3.0).abs() < 1e-12);
        assert!((sma[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sma_constant_series_is_constant() {
        for period in 1..=30 {
            let sma = calculate_sma(&[1.2; 60], period);
            assert_eq!(sma.len(), 60 - period + 1);
            assert!(sma.iter().all(|v| (v - 1.2).abs() < 1e-12));
        }
    }
}
