// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Feeds the ATR-multiple TP/SL offset model.
// =============================================================================

use crate::market_data::Bar;

/// Compute the ATR series from oldest-first bars.
///
/// Warm-up is `period + 1` bars (each TR needs a previous close).  Returns an
/// empty vec when `period` is zero, the input is too short, or a value is
/// non-finite.
pub fn calculate_atr(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return Vec::new();
    }

    let tr_values: Vec<f64> = bars
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            (cur.high - cur.low)
                .max((cur.high - prev.close).abs())
                .max((cur.low - prev.close).abs())
        })
        .collect();

    let period_f = period as f64;
    let seed = tr_values[..period].iter().sum::<f64>() / period_f;
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(tr_values.len() - period + 1);
    result.push(seed);

    let mut atr = seed;
    for &tr in &tr_values[period..] {
        atr = (atr * (period_f - 1.0) + tr) / period_f;
        if !atr.is_finite() {
            return Vec::new();
        }
        result.push(atr);
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: 0,
            high,
            low,
            close,
        }
    }

    #[test]
    fn atr_period_zero() {
        let bars = vec![bar(105.0, 95.0, 102.0); 20];
        assert!(calculate_atr(&bars, 0).is_empty());
    }

    #[test]
    fn atr_insufficient_data() {
        let bars = vec![bar(105.0, 95.0, 102.0); 10];
        assert!(calculate_atr(&bars, 14).is_empty());
    }

    #[test]
    fn atr_exact_minimum_data() {
        let bars = vec![
            bar(102.0, 98.0, 101.0),
            bar(104.0, 99.0, 103.0),
            bar(106.0, 100.0, 105.0),
            bar(108.0, 102.0, 107.0),
        ];
        let atr = calculate_atr(&bars, 3);
        assert_eq!(atr.len(), 1);
        // TRs: 5, 6, 6
        assert!((atr[0] - 17.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn atr_constant_range() {
        let bars: Vec<Bar> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                bar(base + 5.0, base - 5.0, base)
            })
            .collect();
        let atr = *calculate_atr(&bars, 14).last().unwrap();
        assert!((atr - 10.0).abs() < 1.0, "expected ATR near 10.0, got {atr}");
    }

    #[test]
    fn atr_true_range_uses_prev_close() {
        // Gap scenario: |H - prevClose| > H - L
        let bars = vec![
            bar(105.0, 95.0, 95.0),
            bar(115.0, 108.0, 112.0),
            bar(118.0, 110.0, 115.0),
            bar(120.0, 113.0, 118.0),
        ];
        let atr = calculate_atr(&bars, 3)[0];
        assert!(atr > 7.0, "ATR should reflect the gap, got {atr}");
    }

    #[test]
    fn atr_close_only_bars_track_close_changes() {
        // high == low == close: TR collapses to |close - prevClose|.
        let bars: Vec<Bar> = [1.0, 1.5, 1.0, 1.5, 1.0].iter().map(|&c| bar(c, c, c)).collect();
        let atr = calculate_atr(&bars, 2);
        assert_eq!(atr.len(), 3);
        assert!(atr.iter().all(|v| (v - 0.5).abs() < 1e-12));
    }
}
