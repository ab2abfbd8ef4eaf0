// =============================================================================
// PriceSeries Builder
// =============================================================================
//
// Normalises raw observations (close-only ticks or full OHLC candles) into an
// immutable, validated, time-ordered series.
//
// Validation order:
//   1. every close is finite and > 0
//   2. timestamps strictly increase (duplicates rejected)
//   3. length >= the minimum window of the configured indicators
//
// Missing high/low are filled with the close.  This is an approximation: range
// indicators (Stochastic, ADX, ATR) see a zero-range bar for those points.  The
// number of filled observations is kept on the series so callers can tell.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::errors::SeriesError;

/// A single raw price observation as delivered by a market-data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Ordering key. Milliseconds since epoch when the provider supplies real
    /// timestamps, otherwise the arrival index.
    pub timestamp: i64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

impl PriceObservation {
    /// Close-only observation.
    pub fn close_only(timestamp: i64, close: f64) -> Self {
        Self {
            timestamp,
            close,
            open: None,
            high: None,
            low: None,
        }
    }

    /// Full OHLC candle.
    pub fn candle(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            close,
            open: Some(open),
            high: Some(high),
            low: Some(low),
        }
    }

    /// Assign arrival-order indices to closes that carry no timestamp. The
    /// caller must supply them oldest first.
    #[cfg(test)]
    pub fn indexed(closes: &[f64]) -> Vec<Self> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Self::close_only(i as i64, c))
            .collect()
    }
}

/// A normalised bar. High and low are always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Validated, immutable, oldest-first price series.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
    synthetic_ranges: usize,
}

impl PriceSeries {
    /// Validate `raw` and build a series of at least `minimum_length` bars.
    pub fn build(raw: &[PriceObservation], minimum_length: usize) -> Result<Self, SeriesError> {
        let mut bars = Vec::with_capacity(raw.len());
        let mut synthetic_ranges = 0;
        let mut previous: Option<i64> = None;

        for (index, obs) in raw.iter().enumerate() {
            if !obs.close.is_finite() || obs.close <= 0.0 {
                return Err(SeriesError::InvalidObservation {
                    index,
                    value: obs.close,
                });
            }

            if let Some(prev) = previous {
                if obs.timestamp <= prev {
                    return Err(SeriesError::OutOfOrder {
                        index,
                        previous: prev,
                        current: obs.timestamp,
                    });
                }
            }
            previous = Some(obs.timestamp);

            let high = finite_or(obs.high, obs.close);
            let low = finite_or(obs.low, obs.close);
            if obs.high.is_none() || obs.low.is_none() {
                synthetic_ranges += 1;
            }

            bars.push(Bar {
                timestamp: obs.timestamp,
                // A provider occasionally reports a close outside its own range.
                high: high.max(obs.close),
                low: low.min(obs.close),
                close: obs.close,
            });
        }

        if bars.len() < minimum_length {
            return Err(SeriesError::InsufficientData {
                available: bars.len(),
                required: minimum_length,
            });
        }

        Ok(Self {
            bars,
            synthetic_ranges,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Reference price for TP/SL: the most recent close.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Number of observations whose high/low were filled from the close.
    pub fn synthetic_ranges(&self) -> usize {
        self.synthetic_ranges
    }

    /// True when every close is identical. Such input usually comes from a
    /// placeholder history rather than the market.
    pub fn is_flat(&self) -> bool {
        match self.bars.first() {
            Some(first) => self.bars.iter().all(|b| b.close == first.close),
            None => false,
        }
    }

    /// `Err(FlatSeries)` when the series is flat, otherwise the series itself.
    pub fn reject_flat(self) -> Result<Self, SeriesError> {
        if self.is_flat() {
            let price = self.bars[0].close;
            return Err(SeriesError::FlatSeries {
                len: self.bars.len(),
                price,
            });
        }
        Ok(self)
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_fills_missing_range_with_close() {
        let raw = PriceObservation::indexed(&[1.0, 2.0, 3.0]);
        let series = PriceSeries::build(&raw, 3).unwrap();
        assert_eq!(series.highs(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.lows(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.synthetic_ranges(), 3);
    }

    #[test]
    fn build_keeps_real_candles() {
        let raw = vec![
            PriceObservation::candle(1, 1.0, 1.5, 0.5, 1.2),
            PriceObservation::candle(2, 1.2, 1.8, 1.1, 1.7),
        ];
        let series = PriceSeries::build(&raw, 2).unwrap();
        assert_eq!(series.highs(), vec![1.5, 1.8]);
        assert_eq!(series.lows(), vec![0.5, 1.1]);
        assert_eq!(series.synthetic_ranges(), 0);
        assert_eq!(series.last_close(), Some(1.7));
    }

    #[test]
    fn build_rejects_short_series() {
        let raw = PriceObservation::indexed(&[1.0; 10]);
        assert_eq!(
            PriceSeries::build(&raw, 35),
            Err(SeriesError::InsufficientData {
                available: 10,
                required: 35
            })
        );
    }

    #[test]
    fn build_rejects_duplicate_timestamps() {
        let raw = vec![
            PriceObservation::close_only(5, 1.0),
            PriceObservation::close_only(5, 1.1),
        ];
        assert!(matches!(
            PriceSeries::build(&raw, 1),
            Err(SeriesError::OutOfOrder { index: 1, .. })
        ));
    }

    #[test]
    fn build_rejects_descending_timestamps() {
        let raw = vec![
            PriceObservation::close_only(10, 1.0),
            PriceObservation::close_only(9, 1.1),
        ];
        assert!(matches!(
            PriceSeries::build(&raw, 1),
            Err(SeriesError::OutOfOrder { previous: 10, current: 9, .. })
        ));
    }

    #[test]
    fn build_rejects_non_finite_close() {
        let raw = PriceObservation::indexed(&[1.0, f64::NAN, 1.2]);
        assert!(matches!(
            PriceSeries::build(&raw, 1),
            Err(SeriesError::InvalidObservation { index: 1, .. })
        ));
        let raw = PriceObservation::indexed(&[1.0, 0.0]);
        assert!(PriceSeries::build(&raw, 1).is_err());
    }

    #[test]
    fn build_widens_range_to_contain_close() {
        let raw = vec![PriceObservation::candle(1, 1.0, 1.1, 0.9, 1.3)];
        let series = PriceSeries::build(&raw, 1).unwrap();
        assert_eq!(series.bars()[0].high, 1.3);
        assert_eq!(series.bars()[0].low, 0.9);
    }

    #[test]
    fn flat_series_is_flagged_and_rejectable() {
        let raw = PriceObservation::indexed(&[1.2; 30]);
        let series = PriceSeries::build(&raw, 20).unwrap();
        assert!(series.is_flat());
        assert!(matches!(
            series.reject_flat(),
            Err(SeriesError::FlatSeries { len: 30, .. })
        ));

        let raw = PriceObservation::indexed(&[1.2, 1.3]);
        let series = PriceSeries::build(&raw, 2).unwrap();
        assert!(!series.is_flat());
        assert!(series.reject_flat().is_ok());
    }
}
