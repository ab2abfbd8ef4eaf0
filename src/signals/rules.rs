// =============================================================================
// Rule Sets — which indicators vote, how loudly, and how votes are fused
// =============================================================================
//
// A rule set is a tagged value, not a code path: the evaluator reads the mode
// and the named thresholds from it.  Conviction profiles (classic 30/70,
// relaxed 35/65, ...) are plain data.
//
// JSON shape:
//   { "mode": "consensus", "indicators": [{"indicator": "rsi", "weight": 1.0}],
//     "thresholds": {"rsi_oversold": 30.0, ...}, "min_votes": 2 }
//   { "mode": "strict-and", "indicators": [...], "thresholds": {...} }
// =============================================================================

use serde::{Deserialize, Serialize};

/// Indicators a rule set can vote with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Rsi,
    Macd,
    Bollinger,
    Stochastic,
    Adx,
    Sma,
    Ema,
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsi => write!(f, "RSI"),
            Self::Macd => write!(f, "MACD"),
            Self::Bollinger => write!(f, "Bollinger"),
            Self::Stochastic => write!(f, "Stochastic"),
            Self::Adx => write!(f, "ADX"),
            Self::Sma => write!(f, "SMA"),
            Self::Ema => write!(f, "EMA"),
        }
    }
}

/// How the MACD rule reads the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdTrigger {
    /// Vote only on the bar where the histogram changes sign.
    Crossover,
    /// Vote with the current sign of the histogram.
    Sign,
}

fn default_weight() -> f64 {
    1.0
}

/// One enabled indicator and the weight of its vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRule {
    pub indicator: Indicator,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl IndicatorRule {
    pub fn new(indicator: Indicator) -> Self {
        Self {
            indicator,
            weight: default_weight(),
        }
    }
}

// =============================================================================
// Thresholds
// =============================================================================

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_stochastic_oversold() -> f64 {
    20.0
}

fn default_stochastic_overbought() -> f64 {
    80.0
}

fn default_adx_trend_strength() -> f64 {
    25.0
}

fn default_macd_trigger() -> MacdTrigger {
    MacdTrigger::Crossover
}

/// Named numeric thresholds consulted by the per-indicator vote rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// RSI strictly below this votes BUY.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// RSI strictly above this votes SELL.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    #[serde(default = "default_stochastic_oversold")]
    pub stochastic_oversold: f64,

    #[serde(default = "default_stochastic_overbought")]
    pub stochastic_overbought: f64,

    /// Minimum ADX before the dominant DI is allowed to vote.
    #[serde(default = "default_adx_trend_strength")]
    pub adx_trend_strength: f64,

    #[serde(default = "default_macd_trigger")]
    pub macd_trigger: MacdTrigger,
}

impl Thresholds {
    /// Textbook RSI bands, 30 / 70.
    pub fn classic() -> Self {
        Self::default()
    }

    /// Looser RSI bands, 35 / 65. More signals, lower conviction.
    pub fn relaxed() -> Self {
        Self {
            rsi_oversold: 35.0,
            rsi_overbought: 65.0,
            ..Self::default()
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            stochastic_oversold: default_stochastic_oversold(),
            stochastic_overbought: default_stochastic_overbought(),
            adx_trend_strength: default_adx_trend_strength(),
            macd_trigger: default_macd_trigger(),
        }
    }
}

// =============================================================================
// RuleSet
// =============================================================================

fn default_indicators() -> Vec<IndicatorRule> {
    vec![
        IndicatorRule::new(Indicator::Rsi),
        IndicatorRule::new(Indicator::Macd),
        IndicatorRule::new(Indicator::Bollinger),
        IndicatorRule::new(Indicator::Stochastic),
    ]
}

fn default_min_votes() -> usize {
    2
}

/// Signal-fusion policy plus the indicators and thresholds it applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RuleSet {
    /// Weighted majority of non-neutral votes. Ties are HOLD, and the winning
    /// side needs at least `min_votes` agreeing indicators.
    Consensus {
        #[serde(default = "default_indicators")]
        indicators: Vec<IndicatorRule>,
        #[serde(default)]
        thresholds: Thresholds,
        #[serde(default = "default_min_votes")]
        min_votes: usize,
    },
    /// Every enabled indicator must vote the same direction.
    StrictAnd {
        #[serde(default = "default_indicators")]
        indicators: Vec<IndicatorRule>,
        #[serde(default)]
        thresholds: Thresholds,
    },
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::Consensus {
            indicators: default_indicators(),
            thresholds: Thresholds::default(),
            min_votes: default_min_votes(),
        }
    }
}

impl RuleSet {
    /// RSI 30/70 AND MACD histogram sign. The rule the bot shipped with
    /// before rule sets became configurable.
    pub fn rsi_macd_confirmation() -> Self {
        Self::StrictAnd {
            indicators: vec![IndicatorRule::new(Indicator::Rsi), IndicatorRule::new(Indicator::Macd)],
            thresholds: Thresholds {
                macd_trigger: MacdTrigger::Sign,
                ..Thresholds::classic()
            },
        }
    }

    pub fn indicators(&self) -> &[IndicatorRule] {
        match self {
            Self::Consensus { indicators, .. } | Self::StrictAnd { indicators, .. } => indicators,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        match self {
            Self::Consensus { thresholds, .. } | Self::StrictAnd { thresholds, .. } => thresholds,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Consensus { .. } => "consensus",
            Self::StrictAnd { .. } => "strict-and",
        }
    }

    /// Distinct enabled indicators, in configuration order.
    pub fn enabled(&self) -> Vec<Indicator> {
        let mut out: Vec<Indicator> = Vec::new();
        for rule in self.indicators() {
            if !out.contains(&rule.indicator) {
                out.push(rule.indicator);
            }
        }
        out
    }

    /// Reject rule sets that could never produce a meaningful verdict.
    pub fn validate(&self) -> Result<(), String> {
        if self.indicators().is_empty() {
            return Err(format!("{} rule set has no indicators", self.mode_name()));
        }
        // One reading, one vote: a repeated indicator would count itself
        // towards `min_votes`.
        let rules = self.indicators();
        if let Some((i, rule)) = rules
            .iter()
            .enumerate()
            .find(|(i, r)| rules[..*i].iter().any(|earlier| earlier.indicator == r.indicator))
        {
            return Err(format!("{} listed more than once (entry {i})", rule.indicator));
        }
        if let Some(rule) = self.indicators().iter().find(|r| !(r.weight.is_finite() && r.weight > 0.0)) {
            return Err(format!("{} weight must be finite and positive, got {}", rule.indicator, rule.weight));
        }
        let t = self.thresholds();
        if !(0.0..=100.0).contains(&t.rsi_oversold) || t.rsi_oversold >= t.rsi_overbought || t.rsi_overbought > 100.0 {
            return Err(format!(
                "RSI thresholds must satisfy 0 <= oversold < overbought <= 100 (got {} / {})",
                t.rsi_oversold, t.rsi_overbought
            ));
        }
        if !(0.0..=100.0).contains(&t.stochastic_oversold)
            || t.stochastic_oversold >= t.stochastic_overbought
            || t.stochastic_overbought > 100.0
        {
            return Err(format!(
                "Stochastic thresholds must satisfy 0 <= oversold < overbought <= 100 (got {} / {})",
                t.stochastic_oversold, t.stochastic_overbought
            ));
        }
        if let Self::Consensus { min_votes, .. } = self {
            if *min_votes == 0 {
                return Err("consensus min_votes must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

// =============================================================================
// Named profiles
// =============================================================================

/// Preset rule sets selectable by name from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleProfile {
    /// Consensus of RSI, MACD, Bollinger and Stochastic with 30/70 RSI bands.
    Classic,
    /// Same consensus with 35/65 RSI bands.
    Relaxed,
    /// Strict RSI + MACD-sign confirmation.
    RsiMacdConfirmation,
}

impl RuleProfile {
    pub fn rule_set(self) -> RuleSet {
        match self {
            Self::Classic => RuleSet::Consensus {
                indicators: default_indicators(),
                thresholds: Thresholds::classic(),
                min_votes: default_min_votes(),
            },
            Self::Relaxed => RuleSet::Consensus {
                indicators: default_indicators(),
                thresholds: Thresholds::relaxed(),
                min_votes: default_min_votes(),
            },
            Self::RsiMacdConfirmation => RuleSet::rsi_macd_confirmation(),
        }
    }
}

impl std::fmt::Display for RuleProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Relaxed => write!(f, "relaxed"),
            Self::RsiMacdConfirmation => write!(f, "rsi-macd-confirmation"),
        }
    }
}
