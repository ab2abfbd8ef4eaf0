// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction; +DI / -DI carry
// the direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Bar;

/// One aligned ADX reading with its directional indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxValue {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Compute the ADX series from oldest-first bars.
///
/// Warm-up is `2 * period` bars: `period` transitions seed the smoothed
/// +DM/-DM/TR (the first bar has no predecessor), then `period` DX values
/// seed the ADX average.  The output is empty when `period` is zero, the
/// input is shorter than that, or an intermediate value is non-finite.
pub fn calculate_adx(bars: &[Bar], period: usize) -> Vec<AdxValue> {
    if period == 0 || bars.len() < 2 * period {
        return Vec::new();
    }

    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range for each consecutive pair
    // ------------------------------------------------------------------
    let transitions = bars.len() - 1;
    let mut plus_dm = Vec::with_capacity(transitions);
    let mut minus_dm = Vec::with_capacity(transitions);
    let mut tr_vals = Vec::with_capacity(transitions);

    for pair in bars.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);

        let tr = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
        tr_vals.push(tr);
    }

    // ------------------------------------------------------------------
    // Step 3-5: Wilder's smoothing and DX per transition
    // ------------------------------------------------------------------
    let mut smooth_plus_dm: f64 = plus_dm[..period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[..period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[..period].iter().sum();

    let mut directional: Vec<(f64, f64, f64)> = Vec::with_capacity(transitions - period + 1);
    directional.push(compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr));

    for i in period..transitions {
        smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
        smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];
        directional.push(compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr));
    }

    if directional.len() < period || directional.iter().any(|(p, m, dx)| !(p + m + dx).is_finite()) {
        return Vec::new();
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = Wilder's smoothed average of DX
    // ------------------------------------------------------------------
    let mut adx = directional[..period].iter().map(|d| d.2).sum::<f64>() / period_f;
    let (plus_di, minus_di, _) = directional[period - 1];

    let mut result = Vec::with_capacity(directional.len() - period + 1);
    result.push(AdxValue {
        adx,
        plus_di,
        minus_di,
    });

    for &(plus_di, minus_di, dx) in &directional[period..] {
        adx = (adx * (period_f - 1.0) + dx) / period_f;
        result.push(AdxValue {
            adx,
            plus_di,
            minus_di,
        });
    }

    result
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Return `(+DI, -DI, DX)` from smoothed +DM, -DM, and TR.
///
/// A zero true range (no movement at all over the window) yields zeros.
fn compute_dx(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> (f64, f64, f64) {
    if smooth_tr == 0.0 {
        return (0.0, 0.0, 0.0);
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return (plus_di, minus_di, 0.0);
    }

    let dx = ((plus_di - minus_di).abs() / di_sum) * 100.0;
    (plus_di, minus_di, dx)
}
