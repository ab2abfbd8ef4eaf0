// =============================================================================
// Report Assembler — one notification text per run
// =============================================================================
//
// Layout:
//
//   Trading signals (2):
//
//   Forex EURUSD: BUY
//   Entry 1.08420 | TP 1.08637 | SL 1.08203
//
//   Crypto bitcoin: SELL
//   Entry 61250.00 | TP 60025.00 | SL 62475.00
//
// Blocks follow input order.  HOLD results are left out; when nothing is
// left the report is exactly `NO_SIGNAL_MESSAGE`.
// =============================================================================

use std::fmt;

use serde::Serialize;

use crate::types::{Direction, InstrumentResult};

/// Report text when no instrument produced BUY or SELL.
pub const NO_SIGNAL_MESSAGE: &str = "No trading signals this run.";

/// Render the run's results into the notification text.
pub fn assemble(results: &[InstrumentResult]) -> String {
    let blocks: Vec<String> = results.iter().filter(|r| r.is_actionable()).map(render_block).collect();

    if blocks.is_empty() {
        return NO_SIGNAL_MESSAGE.to_string();
    }

    format!("Trading signals ({}):\n\n{}", blocks.len(), blocks.join("\n\n"))
}

fn render_block(result: &InstrumentResult) -> String {
    let v = &result.verdict;
    let level = |x: Option<f64>| x.map(format_price).unwrap_or_else(|| "-".to_string());
    format!(
        "{}: {}\nEntry {} | TP {} | SL {}",
        result.instrument,
        v.direction,
        format_price(v.reference_price),
        level(v.take_profit),
        level(v.stop_loss),
    )
}

/// Decimal places scaled to the price magnitude: five for majors like
/// EURUSD, three for JPY crosses, two for four-digit crypto prices.
pub fn format_price(price: f64) -> String {
    let abs = price.abs();
    let decimals = if abs >= 1000.0 {
        2
    } else if abs >= 10.0 {
        3
    } else if abs >= 1.0 {
        5
    } else {
        6
    };
    format!("{price:.decimals$}")
}

/// Per-run tally for the run log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
    /// Results with at least one recorded error or warning (any direction).
    pub errored: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "buy={} sell={} hold={} errored={}",
            self.buy, self.sell, self.hold, self.errored
        )
    }
}

pub fn summarize(results: &[InstrumentResult]) -> RunSummary {
    results.iter().fold(RunSummary::default(), |mut acc, r| {
        match r.verdict.direction {
            Direction::Buy => acc.buy += 1,
            Direction::Sell => acc.sell += 1,
            Direction::Hold => acc.hold += 1,
        }
        if !r.errors.is_empty() {
            acc.errored += 1;
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Instrument, RiskLevels, TradeVerdict};

    fn result(instrument: Instrument, direction: Direction, price: f64, tp: f64, sl: f64) -> InstrumentResult {
        InstrumentResult {
            instrument,
            verdict: TradeVerdict::with_levels(
                direction,
                price,
                Some(RiskLevels {
                    take_profit: tp,
                    stop_loss: sl,
                }),
            ),
            errors: Vec::new(),
        }
    }

    #[test]
    fn all_hold_is_the_fixed_literal() {
        let results = vec![
            result(Instrument::forex("EURUSD"), Direction::Hold, 1.08, 0.0, 0.0),
            InstrumentResult::failed(Instrument::crypto("bitcoin"), "UpstreamFetchFailure: timeout"),
        ];
        assert_eq!(assemble(&results), NO_SIGNAL_MESSAGE);
        assert_eq!(assemble(&[]), NO_SIGNAL_MESSAGE);
    }

    #[test]
    fn blocks_follow_input_order_and_skip_hold() {
        let results = vec![
            result(Instrument::crypto("bitcoin"), Direction::Sell, 61250.0, 60025.0, 62475.0),
            result(Instrument::forex("GBPUSD"), Direction::Hold, 1.25, 0.0, 0.0),
            result(Instrument::forex("EURUSD"), Direction::Buy, 1.0842, 1.0863684, 1.0820316),
        ];
        let text = assemble(&results);
        assert_eq!(
            text,
            "Trading signals (2):\n\n\
             Crypto bitcoin: SELL\nEntry 61250.00 | TP 60025.00 | SL 62475.00\n\n\
             Forex EURUSD: BUY\nEntry 1.08420 | TP 1.08637 | SL 1.08203"
        );
        assert!(!text.contains("GBPUSD"));
    }

    #[test]
    fn price_precision_tracks_magnitude() {
        assert_eq!(format_price(1.0842), "1.08420");
        assert_eq!(format_price(151.234), "151.234");
        assert_eq!(format_price(61250.0), "61250.00");
        assert_eq!(format_price(0.52), "0.520000");
    }

    #[test]
    fn summary_counts_directions_and_errors() {
        let results = vec![
            result(Instrument::forex("EURUSD"), Direction::Buy, 1.0, 1.1, 0.9),
            result(Instrument::forex("GBPUSD"), Direction::Sell, 1.0, 0.9, 1.1),
            result(Instrument::forex("USDJPY"), Direction::Hold, 150.0, 0.0, 0.0),
            InstrumentResult::failed(Instrument::crypto("solana"), "InsufficientData: 3 observations, 35 required"),
        ];
        let s = summarize(&results);
        assert_eq!(
            s,
            RunSummary {
                buy: 1,
                sell: 1,
                hold: 2,
                errored: 1
            }
        );
        assert_eq!(s.to_string(), "buy=1 sell=1 hold=2 errored=1");
    }
}
