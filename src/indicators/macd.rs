// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   signal line = EMA(signal) of the MACD line
//   histogram   = MACD line - signal line
//
// Both EMAs are SMA-seeded (see `ema.rs`), so the MACD line starts at input
// index `slow - 1` and the signal line `signal - 1` values later.  The first
// output therefore lands at input index `slow + signal - 2`.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;

/// One aligned MACD reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute the MACD series.
///
/// Returns an empty vec when any period is zero, when `fast >= slow`, or when
/// there are fewer than `slow + signal - 1` closes.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<MacdValue> {
    if fast == 0 || slow == 0 || signal == 0 || fast >= slow {
        return Vec::new();
    }
    if closes.len() < slow + signal - 1 {
        return Vec::new();
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    // Align the fast EMA onto the slow EMA's first index.
    let offset = slow - fast;
    if fast_ema.len() < offset + slow_ema.len() {
        return Vec::new();
    }
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, s)| fast_ema[i + offset] - s)
        .collect();

    let signal_line = calculate_ema(&macd_line, signal);
    let skip = signal - 1;

    signal_line
        .iter()
        .zip(&macd_line[skip..])
        .map(|(&sig, &line)| MacdValue {
            macd: line,
            signal: sig,
            histogram: line - sig,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_rejects_bad_periods() {
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert!(calculate_macd(&closes, 0, 26, 9).is_empty());
        assert!(calculate_macd(&closes, 26, 12, 9).is_empty());
        assert!(calculate_macd(&closes, 12, 12, 9).is_empty());
        assert!(calculate_macd(&closes, 12, 26, 0).is_empty());
    }

    #[test]
    fn macd_warmup_length() {
        let closes: Vec<f64> = (1..=34).map(|x| x as f64).collect();
        assert_eq!(calculate_macd(&closes, 12, 26, 9).len(), 1);
        assert!(calculate_macd(&closes[..33], 12, 26, 9).is_empty());

        let closes: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        assert_eq!(calculate_macd(&closes, 12, 26, 9).len(), 50 - 34 + 1);
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let macd = calculate_macd(&[1.2; 60], 12, 26, 9);
        assert!(!macd.is_empty());
        for v in &macd {
            assert!(v.macd.abs() < 1e-12);
            assert!(v.signal.abs() < 1e-12);
            assert!(v.histogram.abs() < 1e-12);
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (1..=80).map(|x| 100.0 + x as f64).collect();
        let last = *calculate_macd(&closes, 12, 26, 9).last().unwrap();
        assert!(last.macd > 0.0);
        assert!((last.histogram - (last.macd - last.signal)).abs() < 1e-12);
    }

    #[test]
    fn macd_line_matches_ema_difference() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.4).sin() * 5.0).collect();
        let macd = calculate_macd(&closes, 3, 6, 4);
        let fast = calculate_ema(&closes, 3);
        let slow = calculate_ema(&closes, 6);
        let last = macd.last().unwrap();
        let expected = fast.last().unwrap() - slow.last().unwrap();
        assert!((last.macd - expected).abs() < 1e-12);
    }

    #[test]
    fn macd_histogram_turns_positive_after_reversal() {
        // Accelerating decline then a sharp recovery.
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 - 0.02 * (i * i) as f64).collect();
        let bottom = *closes.last().unwrap();
        closes.extend((1..=15).map(|i| bottom + i as f64 * 1.5));
        let macd = calculate_macd(&closes, 12, 26, 9);
        assert!(macd[0].histogram < 0.0);
        assert!(macd.last().unwrap().histogram > 0.0);
        let crossed = macd
            .windows(2)
            .any(|w| w[0].histogram <= 0.0 && w[1].histogram > 0.0);
        assert!(crossed);
    }
}
