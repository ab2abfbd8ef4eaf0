// =============================================================================
// Indicator Snapshot — latest reading of every enabled indicator
// =============================================================================
//
// Built fresh from one `PriceSeries` on every run and never cached.  A field
// is `None` when the series was too short for that indicator; the evaluator
// treats that as an abstention.

use serde::Serialize;

use crate::config::IndicatorParams;
use crate::indicators::{
    calculate_adx, calculate_atr, calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi,
    calculate_sma, calculate_stochastic, AdxValue, BollingerBands, MacdValue, StochasticValue,
};
use crate::market_data::PriceSeries;
use crate::signals::rules::Indicator;

/// Latest MACD reading plus the histogram one bar earlier, which the
/// crossover rule needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdSnapshot {
    #[serde(flatten)]
    pub current: MacdValue,
    pub previous_histogram: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBands>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stochastic: Option<StochasticValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adx: Option<AdxValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema: Option<f64>,
    /// Not voted on; consumed by the ATR offset model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<f64>,
}

impl IndicatorSnapshot {
    /// Compute the latest value of each indicator in `enabled`, plus ATR.
    pub fn compute(series: &PriceSeries, params: &IndicatorParams, enabled: &[Indicator]) -> Self {
        let closes = series.closes();
        let mut snapshot = Self {
            atr: calculate_atr(series.bars(), params.atr_period).last().copied(),
            ..Self::default()
        };

        for indicator in enabled {
            match indicator {
                Indicator::Rsi => {
                    snapshot.rsi = calculate_rsi(&closes, params.rsi_period).last().copied();
                }
                Indicator::Macd => {
                    let series = calculate_macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
                    snapshot.macd = series.last().map(|&current| MacdSnapshot {
                        current,
                        previous_histogram: series.len().checked_sub(2).map(|i| series[i].histogram),
                    });
                }
                Indicator::Bollinger => {
                    snapshot.bollinger =
                        calculate_bollinger(&closes, params.bollinger_period, params.bollinger_std_dev)
                            .last()
                            .copied();
                }
                Indicator::Stochastic => {
                    snapshot.stochastic = calculate_stochastic(
                        &series.highs(),
                        &series.lows(),
                        &closes,
                        params.stochastic_period,
                        params.stochastic_signal,
                    )
                    .last()
                    .copied();
                }
                Indicator::Adx => {
                    snapshot.adx = calculate_adx(series.bars(), params.adx_period).last().copied();
                }
                Indicator::Sma => {
                    snapshot.sma = calculate_sma(&closes, params.sma_period).last().copied();
                }
                Indicator::Ema => {
                    snapshot.ema = calculate_ema(&closes, params.ema_period).last().copied();
                }
            }
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceObservation;

    const ALL: [Indicator; 7] = [
        Indicator::Rsi,
        Indicator::Macd,
        Indicator::Bollinger,
        Indicator::Stochastic,
        Indicator::Adx,
        Indicator::Sma,
        Indicator::Ema,
    ];

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::build(&PriceObservation::indexed(closes), 1).unwrap()
    }

    #[test]
    fn only_enabled_indicators_are_computed() {
        let closes: Vec<f64> = (0..60).map(|i| 1.0 + (i as f64 * 0.3).sin() * 0.01).collect();
        let snap = IndicatorSnapshot::compute(&series(&closes), &IndicatorParams::default(), &[Indicator::Rsi]);
        assert!(snap.rsi.is_some());
        assert!(snap.macd.is_none());
        assert!(snap.bollinger.is_none());
        assert!(snap.atr.is_some());
    }

    #[test]
    fn short_series_leaves_hungry_indicators_empty() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let snap = IndicatorSnapshot::compute(&series(&closes), &IndicatorParams::default(), &ALL);
        assert!(snap.rsi.is_some());
        assert!(snap.bollinger.is_some());
        assert!(snap.macd.is_none());
        assert!(snap.sma.is_none());
        assert!(snap.adx.is_none());
    }

    #[test]
    fn flat_series_snapshot() {
        let snap = IndicatorSnapshot::compute(&series(&[1.2; 60]), &IndicatorParams::default(), &ALL);
        assert_eq!(snap.rsi, Some(100.0));
        assert_eq!(snap.stochastic.map(|s| s.k), Some(50.0));
        assert!(snap.bollinger.unwrap().is_degenerate());
        let macd = snap.macd.unwrap();
        assert!(macd.current.histogram.abs() < 1e-12);
        assert!(macd.previous_histogram.is_some());
        assert!((snap.sma.unwrap() - 1.2).abs() < 1e-12);
        assert!((snap.ema.unwrap() - 1.2).abs() < 1e-12);
        assert_eq!(snap.atr, Some(0.0));
    }

    #[test]
    fn macd_previous_histogram_requires_two_readings() {
        let closes: Vec<f64> = (1..=34).map(|x| x as f64).collect();
        let snap = IndicatorSnapshot::compute(&series(&closes), &IndicatorParams::default(), &[Indicator::Macd]);
        let macd = snap.macd.unwrap();
        assert!(macd.previous_histogram.is_none());
    }

    #[test]
    fn snapshot_serialises_only_present_values() {
        let snap = IndicatorSnapshot {
            rsi: Some(42.0),
            ..IndicatorSnapshot::default()
        };
        assert_eq!(serde_json::to_string(&snap).unwrap(), r#"{"rsi":42.0}"#);
    }
}
