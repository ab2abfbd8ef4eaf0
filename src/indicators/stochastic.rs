// =============================================================================
// Stochastic Oscillator
// =============================================================================
//
//   %K = 100 * (close - lowest_low(period)) / (highest_high(period) - lowest_low(period))
//   %D = SMA(signal_period) of %K
//
// A window with no range (highest high == lowest low) has no defined position;
// %K is pinned to 50 there instead of dividing by zero.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::sma::calculate_sma;

/// %K reported for a window whose high and low coincide.
pub const DEGENERATE_K: f64 = 50.0;

/// One aligned stochastic reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

/// Compute the raw %K series. Output element `i` covers input window
/// `i..i + period`.
pub fn calculate_percent_k(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    if period == 0 || n < period || highs.len() != n || lows.len() != n {
        return Vec::new();
    }

    (period - 1..n)
        .map(|i| {
            let start = i + 1 - period;
            let highest = highs[start..=i].iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let lowest = lows[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
            let range = highest - lowest;
            if range > 0.0 {
                (100.0 * (closes[i] - lowest) / range).clamp(0.0, 100.0)
            } else {
                DEGENERATE_K
            }
        })
        .collect()
}

/// Compute the %K / %D series.
///
/// Warm-up is `period + signal_period - 1` bars; every output carries both
/// lines.  Slices of unequal length produce an empty vec.
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    signal_period: usize,
) -> Vec<StochasticValue> {
    if signal_period == 0 {
        return Vec::new();
    }

    let k = calculate_percent_k(highs, lows, closes, period);
    let d = calculate_sma(&k, signal_period);
    if d.is_empty() {
        return Vec::new();
    }

    k[signal_period - 1..]
        .iter()
        .zip(d.iter())
        .map(|(&k, &d)| StochasticValue { k, d })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stochastic_rejects_bad_input() {
        let v = vec![1.0; 20];
        assert!(calculate_stochastic(&v, &v, &v, 0, 3).is_empty());
        assert!(calculate_stochastic(&v, &v, &v, 14, 0).is_empty());
        assert!(calculate_stochastic(&v[..10], &v, &v, 14, 3).is_empty());
        assert!(calculate_stochastic(&v[..15], &v[..15], &v[..15], 14, 3).is_empty());
    }

    #[test]
    fn stochastic_warmup_length() {
        let v: Vec<f64> = (1..=16).map(|x| x as f64).collect();
        assert_eq!(calculate_stochastic(&v, &v, &v, 14, 3).len(), 1);
        let v: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        assert_eq!(calculate_stochastic(&v, &v, &v, 14, 3).len(), 40 - 16 + 1);
    }

    #[test]
    fn stochastic_flat_window_is_exactly_fifty() {
        let v = vec![1.2; 60];
        let series = calculate_stochastic(&v, &v, &v, 14, 3);
        assert!(!series.is_empty());
        for s in &series {
            assert_eq!(s.k, 50.0);
            assert_eq!(s.d, 50.0);
            assert!(!s.k.is_nan());
        }
    }

    #[test]
    fn stochastic_close_at_extremes() {
        // Rising closes sit on the highest high; falling ones on the lowest low.
        let up: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let last = *calculate_stochastic(&up, &up, &up, 14, 3).last().unwrap();
        assert!((last.k - 100.0).abs() < 1e-12);

        let down: Vec<f64> = up.iter().rev().copied().collect();
        let last = *calculate_stochastic(&down, &down, &down, 14, 3).last().unwrap();
        assert!(last.k.abs() < 1e-12);
    }

    #[test]
    fn stochastic_uses_high_low_range() {
        let highs = [12.0, 12.0, 12.0];
        let lows = [8.0, 8.0, 8.0];
        let closes = [10.0, 11.0, 9.0];
        let k = calculate_percent_k(&highs, &lows, &closes, 3);
        assert_eq!(k.len(), 1);
        assert!((k[0] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn percent_d_is_mean_of_k() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + (i as f64 * 0.7).sin()).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.5).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.5).collect();
        let k = calculate_percent_k(&highs, &lows, &closes, 5);
        let series = calculate_stochastic(&highs, &lows, &closes, 5, 3);
        let last = series.last().unwrap();
        let expected = k[k.len() - 3..].iter().sum::<f64>() / 3.0;
        assert!((last.d - expected).abs() < 1e-12);
        assert_eq!(last.k, *k.last().unwrap());
    }
}
