// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), σ being the population standard deviation of
// the trailing window. The Band Width (BBW) is the normalised distance:
// BBW = (upper - lower) / middle * 100.
//
// A zero width means the window had no variance; the evaluator does not vote
// on such bands.

use serde::{Deserialize, Serialize};

/// One aligned Bollinger reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

impl BollingerBands {
    /// True when the window had no variance and the bands collapsed onto the
    /// middle line.
    pub fn is_degenerate(&self) -> bool {
        self.upper - self.lower <= 0.0
    }
}

/// Calculate Bollinger Bands over every trailing window of `closes`.
///
/// Returns an empty vec when `period == 0` or fewer than `period` closes are
/// available. Windows whose middle band is zero or whose result is
/// non-finite truncate the series.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Vec<BollingerBands> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    let mut result = Vec::with_capacity(closes.len() - period + 1);

    for window in closes.windows(period) {
        let middle = window.iter().sum::<f64>() / period_f;
        if middle == 0.0 {
            break;
        }

        let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period_f;
        let std_dev = variance.sqrt();

        let upper = middle + num_std * std_dev;
        let lower = middle - num_std * std_dev;
        let width = (upper - lower) / middle * 100.0;

        if !width.is_finite() {
            break;
        }
        result.push(BollingerBands {
            upper,
            middle,
            lower,
            width,
        });
    }

    result
}
