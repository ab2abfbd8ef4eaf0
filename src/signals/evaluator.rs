// =============================================================================
// Signal Evaluator — per-indicator votes fused into one direction
// =============================================================================
//
// Every enabled indicator casts exactly one `RuleVote`.  A missing snapshot
// value is an abstention (NEUTRAL), never an error.
//
// Consensus:   weighted majority of BUY vs SELL votes.  Equal weight is HOLD,
//              and the winning side also needs `min_votes` indicators.
// Strict-AND:  every enabled indicator must vote the same direction.
//
// Pure: the same snapshot, price, and rule set always give the same result.
// =============================================================================

use serde::Serialize;

use crate::signals::rules::{Indicator, IndicatorRule, MacdTrigger, RuleSet, Thresholds};
use crate::signals::snapshot::IndicatorSnapshot;
use crate::types::{Direction, VoteDirection};

/// The vote of one indicator under one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleVote {
    pub indicator: Indicator,
    pub direction: VoteDirection,
    pub weight: f64,
}

/// Fused outcome of one evaluation, with the tally that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub direction: Direction,
    pub votes: Vec<RuleVote>,
    pub buy_weight: f64,
    pub sell_weight: f64,
    pub buy_votes: usize,
    pub sell_votes: usize,
}

impl Evaluation {
    /// Compact `RSI=SELL MACD=NEUTRAL ...` rendering for logs.
    pub fn vote_summary(&self) -> String {
        self.votes
            .iter()
            .map(|v| format!("{}={}", v.indicator, v.direction))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Evaluate `snapshot` at `reference_price` under `rule_set`.
pub fn evaluate(snapshot: &IndicatorSnapshot, reference_price: f64, rule_set: &RuleSet) -> Evaluation {
    let thresholds = rule_set.thresholds();
    let votes: Vec<RuleVote> = rule_set
        .indicators()
        .iter()
        .map(|rule| cast_vote(rule, snapshot, reference_price, thresholds))
        .collect();

    let mut buy_weight = 0.0;
    let mut sell_weight = 0.0;
    let mut buy_votes = 0;
    let mut sell_votes = 0;
    for vote in &votes {
        match vote.direction {
            VoteDirection::Buy => {
                buy_weight += vote.weight;
                buy_votes += 1;
            }
            VoteDirection::Sell => {
                sell_weight += vote.weight;
                sell_votes += 1;
            }
            VoteDirection::Neutral => {}
        }
    }

    let direction = match rule_set {
        RuleSet::Consensus { min_votes, .. } => {
            if buy_weight > sell_weight && buy_votes >= *min_votes {
                Direction::Buy
            } else if sell_weight > buy_weight && sell_votes >= *min_votes {
                Direction::Sell
            } else {
                Direction::Hold
            }
        }
        RuleSet::StrictAnd { .. } => {
            let unanimous = |d: VoteDirection| !votes.is_empty() && votes.iter().all(|v| v.direction == d);
            if unanimous(VoteDirection::Buy) {
                Direction::Buy
            } else if unanimous(VoteDirection::Sell) {
                Direction::Sell
            } else {
                Direction::Hold
            }
        }
    };

    Evaluation {
        direction,
        votes,
        buy_weight,
        sell_weight,
        buy_votes,
        sell_votes,
    }
}

/// Apply the vote rule of a single indicator.
pub fn cast_vote(
    rule: &IndicatorRule,
    snapshot: &IndicatorSnapshot,
    price: f64,
    thresholds: &Thresholds,
) -> RuleVote {
    let direction = match rule.indicator {
        Indicator::Rsi => snapshot.rsi.map(|rsi| {
            if rsi < thresholds.rsi_oversold {
                VoteDirection::Buy
            } else if rsi > thresholds.rsi_overbought {
                VoteDirection::Sell
            } else {
                VoteDirection::Neutral
            }
        }),
        Indicator::Macd => snapshot.macd.and_then(|macd| {
            let hist = macd.current.histogram;
            match thresholds.macd_trigger {
                MacdTrigger::Sign => Some(sign_vote(hist)),
                MacdTrigger::Crossover => macd.previous_histogram.map(|prev| {
                    if prev <= 0.0 && hist > 0.0 {
                        VoteDirection::Buy
                    } else if prev >= 0.0 && hist < 0.0 {
                        VoteDirection::Sell
                    } else {
                        VoteDirection::Neutral
                    }
                }),
            }
        }),
        // A collapsed band has price on both edges at once; it says nothing.
        Indicator::Bollinger => snapshot.bollinger.filter(|bb| !bb.is_degenerate()).map(|bb| {
            if price <= bb.lower {
                VoteDirection::Buy
            } else if price >= bb.upper {
                VoteDirection::Sell
            } else {
                VoteDirection::Neutral
            }
        }),
        Indicator::Stochastic => snapshot.stochastic.map(|s| {
            if s.k < thresholds.stochastic_oversold {
                VoteDirection::Buy
            } else if s.k > thresholds.stochastic_overbought {
                VoteDirection::Sell
            } else {
                VoteDirection::Neutral
            }
        }),
        Indicator::Adx => snapshot.adx.map(|adx| {
            if adx.adx < thresholds.adx_trend_strength {
                VoteDirection::Neutral
            } else if adx.plus_di > adx.minus_di {
                VoteDirection::Buy
            } else if adx.minus_di > adx.plus_di {
                VoteDirection::Sell
            } else {
                VoteDirection::Neutral
            }
        }),
        Indicator::Sma => snapshot.sma.map(|avg| sign_vote(price - avg)),
        Indicator::Ema => snapshot.ema.map(|avg| sign_vote(price - avg)),
    };

    RuleVote {
        indicator: rule.indicator,
        direction: direction.unwrap_or(VoteDirection::Neutral),
        weight: rule.weight,
    }
}

fn sign_vote(value: f64) -> VoteDirection {
    if value > 0.0 {
        VoteDirection::Buy
    } else if value < 0.0 {
        VoteDirection::Sell
    } else {
        VoteDirection::Neutral
    }
}
