// =============================================================================
// Risk Calculator — take-profit / stop-loss levels for a verdict
// =============================================================================
//
// Offset models:
//   percent       — fixed percentage distances from the reference price.
//   atr-multiple  — distances are ATR multiples, floored at a minimum
//                   percentage of the reference price.  Without an ATR reading
//                   the floors are used as-is.
//
// BUY:  TP = price + tp_distance,  SL = price - sl_distance
// SELL: TP = price - tp_distance,  SL = price + sl_distance
// HOLD: no levels.
//
// Percentages are expressed in percent (0.2 means 0.2 %).
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::{AssetClass, Direction, RiskLevels};

/// How far TP and SL sit from the reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum OffsetModel {
    Percent {
        take_profit_pct: f64,
        stop_loss_pct: f64,
    },
    AtrMultiple {
        take_profit_mult: f64,
        stop_loss_mult: f64,
        min_take_profit_pct: f64,
        min_stop_loss_pct: f64,
    },
}

impl OffsetModel {
    pub fn percent(take_profit_pct: f64, stop_loss_pct: f64) -> Self {
        Self::Percent {
            take_profit_pct,
            stop_loss_pct,
        }
    }

    /// `(tp_distance, sl_distance)` in price units.
    fn distances(&self, price: f64, atr: Option<f64>) -> (f64, f64) {
        match *self {
            Self::Percent {
                take_profit_pct,
                stop_loss_pct,
            } => (price * take_profit_pct / 100.0, price * stop_loss_pct / 100.0),
            Self::AtrMultiple {
                take_profit_mult,
                stop_loss_mult,
                min_take_profit_pct,
                min_stop_loss_pct,
            } => {
                let min_tp = price * min_take_profit_pct / 100.0;
                let min_sl = price * min_stop_loss_pct / 100.0;
                match atr.filter(|a| a.is_finite() && *a > 0.0) {
                    Some(atr) => ((atr * take_profit_mult).max(min_tp), (atr * stop_loss_mult).max(min_sl)),
                    None => (min_tp, min_sl),
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let values: Vec<f64> = match self {
            Self::Percent {
                take_profit_pct,
                stop_loss_pct,
            } => vec![*take_profit_pct, *stop_loss_pct],
            Self::AtrMultiple {
                take_profit_mult,
                stop_loss_mult,
                min_take_profit_pct,
                min_stop_loss_pct,
            } => vec![*take_profit_mult, *stop_loss_mult, *min_take_profit_pct, *min_stop_loss_pct],
        };
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(format!("offset values must be finite and non-negative: {self:?}"));
        }
        // A 100 % stop below a long entry would put the level at or under zero.
        let (tp, sl) = self.distances(1.0, None);
        if tp >= 1.0 || sl >= 1.0 {
            return Err(format!("percentage offsets must stay below 100: {self:?}"));
        }
        Ok(())
    }
}

impl Default for OffsetModel {
    fn default() -> Self {
        Self::percent(0.2, 0.2)
    }
}

// =============================================================================
// Per-class profiles
// =============================================================================

fn default_forex_offsets() -> OffsetModel {
    OffsetModel::percent(0.2, 0.2)
}

fn default_crypto_offsets() -> OffsetModel {
    OffsetModel::percent(2.0, 2.0)
}

/// Offset model per asset class. Crypto moves roughly an order of magnitude
/// more than major FX pairs per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetProfiles {
    #[serde(default = "default_forex_offsets")]
    pub forex: OffsetModel,
    #[serde(default = "default_crypto_offsets")]
    pub crypto: OffsetModel,
}

impl Default for OffsetProfiles {
    fn default() -> Self {
        Self {
            forex: default_forex_offsets(),
            crypto: default_crypto_offsets(),
        }
    }
}

impl OffsetProfiles {
    pub fn for_class(&self, class: AssetClass) -> &OffsetModel {
        match class {
            AssetClass::Forex => &self.forex,
            AssetClass::Crypto => &self.crypto,
        }
    }
}

/// Derive TP/SL for `direction` around `reference_price`.
///
/// Returns `None` for HOLD, for a non-finite or non-positive price, and when
/// either level would not be a positive price.
pub fn compute_levels(
    direction: Direction,
    reference_price: f64,
    model: &OffsetModel,
    atr: Option<f64>,
) -> Option<RiskLevels> {
    if !reference_price.is_finite() || reference_price <= 0.0 {
        return None;
    }

    let (tp_dist, sl_dist) = model.distances(reference_price, atr);
    let levels = match direction {
        Direction::Buy => RiskLevels {
            take_profit: reference_price + tp_dist,
            stop_loss: reference_price - sl_dist,
        },
        Direction::Sell => RiskLevels {
            take_profit: reference_price - tp_dist,
            stop_loss: reference_price + sl_dist,
        },
        Direction::Hold => return None,
    };

    // ATR distances are unbounded: on a cheap, volatile asset the long stop
    // (or the short target) can land at or below zero.
    let valid = |x: f64| x.is_finite() && x > 0.0;
    (valid(levels.take_profit) && valid(levels.stop_loss)).then_some(levels)
}
