// =============================================================================
// Shared types used across the signal pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Final recommendation for one instrument on one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Hold
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Direction of a single indicator vote. `Neutral` is an abstention, which is
/// distinct from a `Hold` verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteDirection {
    Buy,
    Sell,
    Neutral,
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Instrument family. Selects the market-data source and the TP/SL profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Forex,
    Crypto,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forex => write!(f, "Forex"),
            Self::Crypto => write!(f, "Crypto"),
        }
    }
}

impl std::str::FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forex" | "fx" => Ok(Self::Forex),
            "crypto" => Ok(Self::Crypto),
            other => Err(format!("unknown asset class '{other}'")),
        }
    }
}

/// An instrument the pipeline evaluates on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Provider symbol, e.g. `EURUSD` or the CoinGecko id `bitcoin`.
    pub id: String,
    pub class: AssetClass,
}

impl Instrument {
    pub fn forex(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: AssetClass::Forex,
        }
    }

    pub fn crypto(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: AssetClass::Crypto,
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.class, self.id)
    }
}

/// Take-profit / stop-loss pair derived from a directional verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// Verdict for one instrument. HOLD never carries risk levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeVerdict {
    pub direction: Direction,
    pub reference_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
}

impl TradeVerdict {
    pub fn hold(reference_price: f64) -> Self {
        Self {
            direction: Direction::Hold,
            reference_price,
            take_profit: None,
            stop_loss: None,
        }
    }

    /// Build a verdict from a direction and the levels computed for it.
    /// A missing `levels` always degrades to HOLD.
    pub fn with_levels(direction: Direction, reference_price: f64, levels: Option<RiskLevels>) -> Self {
        match (direction, levels) {
            (Direction::Hold, _) | (_, None) => Self::hold(reference_price),
            (direction, Some(levels)) => Self {
                direction,
                reference_price,
                take_profit: Some(levels.take_profit),
                stop_loss: Some(levels.stop_loss),
            },
        }
    }
}

/// Outcome for one requested instrument. Errors accumulate here instead of
/// aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentResult {
    pub instrument: Instrument,
    pub verdict: TradeVerdict,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl InstrumentResult {
    /// A HOLD result carrying a single error reason, for an instrument with
    /// no usable price at all (e.g. the fetch failed).
    pub fn failed(instrument: Instrument, reason: impl Into<String>) -> Self {
        Self::failed_at(instrument, 0.0, reason)
    }

    /// A HOLD result at the last price seen before the failure.
    pub fn failed_at(instrument: Instrument, reference_price: f64, reason: impl Into<String>) -> Self {
        Self {
            instrument,
            verdict: TradeVerdict::hold(reference_price),
            errors: vec![reason.into()],
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.verdict.direction != Direction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display_is_uppercase() {
        assert_eq!(Direction::Buy.to_string(), "BUY");
        assert_eq!(Direction::Sell.to_string(), "SELL");
        assert_eq!(Direction::Hold.to_string(), "HOLD");
    }

    #[test]
    fn asset_class_parses_aliases() {
        assert_eq!("FX".parse::<AssetClass>().unwrap(), AssetClass::Forex);
        assert_eq!(" crypto ".parse::<AssetClass>().unwrap(), AssetClass::Crypto);
        assert!("stocks".parse::<AssetClass>().is_err());
    }

    #[test]
    fn hold_verdict_drops_levels() {
        let levels = RiskLevels {
            take_profit: 1.1,
            stop_loss: 0.9,
        };
        let v = TradeVerdict::with_levels(Direction::Hold, 1.0, Some(levels));
        assert_eq!(v.direction, Direction::Hold);
        assert!(v.take_profit.is_none());
        assert!(v.stop_loss.is_none());
    }

    #[test]
    fn directional_verdict_without_levels_degrades_to_hold() {
        let v = TradeVerdict::with_levels(Direction::Buy, 1.0, None);
        assert_eq!(v.direction, Direction::Hold);
    }

    #[test]
    fn verdict_serialises_without_empty_levels() {
        let json = serde_json::to_string(&TradeVerdict::hold(2.5)).unwrap();
        assert_eq!(json, r#"{"direction":"HOLD","reference_price":2.5}"#);
    }

    #[test]
    fn failed_result_keeps_last_price() {
        let r = InstrumentResult::failed_at(Instrument::forex("EURUSD"), 1.0842, "InsufficientData: 3 observations, 35 required");
        assert_eq!(r.verdict, TradeVerdict::hold(1.0842));
        assert!(!r.is_actionable());
        assert_eq!(InstrumentResult::failed(Instrument::crypto("solana"), "x").verdict.reference_price, 0.0);
    }
}
