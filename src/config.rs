// =============================================================================
// Signal Configuration — one immutable settings object per process
// =============================================================================
//
// Everything the pipeline needs: the instrument list, indicator periods, the
// rule set, TP/SL offsets per asset class, and market-data source settings.
//
// Loaded once at startup from JSON (every field carries a serde default so a
// partial file still loads), optionally overridden from the environment, then
// validated and shared read-only.  Nothing mutates it afterwards.
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::risk::OffsetProfiles;
use crate::signals::{Indicator, RuleProfile, RuleSet};
use crate::types::{AssetClass, Instrument};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_instruments() -> Vec<Instrument> {
    let forex = [
        "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "EURCHF", "AUDUSD", "NZDUSD", "EURJPY", "GBPJPY", "AUDJPY",
    ];
    let crypto = ["bitcoin", "ethereum", "binancecoin", "solana", "ripple"];
    forex
        .iter()
        .map(|id| Instrument::forex(*id))
        .chain(crypto.iter().map(|id| Instrument::crypto(*id)))
        .collect()
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_bollinger_period() -> usize {
    20
}

fn default_bollinger_std_dev() -> f64 {
    2.0
}

fn default_stochastic_period() -> usize {
    14
}

fn default_stochastic_signal() -> usize {
    3
}

fn default_adx_period() -> usize {
    14
}

fn default_sma_period() -> usize {
    50
}

fn default_ema_period() -> usize {
    20
}

fn default_atr_period() -> usize {
    14
}

fn default_twelvedata_interval() -> String {
    "1h".to_string()
}

fn default_twelvedata_outputsize() -> usize {
    50
}

fn default_coingecko_days() -> u32 {
    3
}

/// CoinGecko switches from hourly to daily points above this many days.
const COINGECKO_HOURLY_MAX_DAYS: u32 = 90;

fn default_request_timeout_secs() -> u64 {
    10
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Periods and parameters of every indicator the evaluator may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Band distance in population standard deviations.
    #[serde(default = "default_bollinger_std_dev")]
    pub bollinger_std_dev: f64,

    #[serde(default = "default_stochastic_period")]
    pub stochastic_period: usize,

    /// %D smoothing period.
    #[serde(default = "default_stochastic_signal")]
    pub stochastic_signal: usize,

    #[serde(default = "default_adx_period")]
    pub adx_period: usize,

    #[serde(default = "default_sma_period")]
    pub sma_period: usize,

    #[serde(default = "default_ema_period")]
    pub ema_period: usize,

    /// Only used by the ATR offset model.
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bollinger_period: default_bollinger_period(),
            bollinger_std_dev: default_bollinger_std_dev(),
            stochastic_period: default_stochastic_period(),
            stochastic_signal: default_stochastic_signal(),
            adx_period: default_adx_period(),
            sma_period: default_sma_period(),
            ema_period: default_ema_period(),
            atr_period: default_atr_period(),
        }
    }
}

impl IndicatorParams {
    /// Observations `indicator` needs before the evaluator can read it.
    ///
    /// MACD asks for one bar more than its signal line's warm-up so the
    /// crossover rule has a previous histogram to compare against.
    pub fn warmup(&self, indicator: Indicator) -> usize {
        match indicator {
            Indicator::Rsi => self.rsi_period + 1,
            Indicator::Macd => self.macd_slow + self.macd_signal,
            Indicator::Bollinger => self.bollinger_period,
            Indicator::Stochastic => self.stochastic_period + self.stochastic_signal.saturating_sub(1),
            Indicator::Adx => 2 * self.adx_period,
            Indicator::Sma => self.sma_period,
            Indicator::Ema => self.ema_period,
        }
    }

    /// Minimum series length for the union of `indicators`.
    pub fn minimum_length(&self, indicators: &[Indicator]) -> usize {
        indicators.iter().map(|&i| self.warmup(i)).max().unwrap_or(1).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("stochastic_period", self.stochastic_period),
            ("stochastic_signal", self.stochastic_signal),
            ("adx_period", self.adx_period),
            ("sma_period", self.sma_period),
            ("ema_period", self.ema_period),
            ("atr_period", self.atr_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            bail!("indicator period {name} must be at least 1");
        }
        if self.macd_fast >= self.macd_slow {
            bail!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast,
                self.macd_slow
            );
        }
        if !self.bollinger_std_dev.is_finite() || self.bollinger_std_dev <= 0.0 {
            bail!("bollinger_std_dev must be positive, got {}", self.bollinger_std_dev);
        }
        Ok(())
    }
}

// =============================================================================
// SourceSettings
// =============================================================================

/// Request parameters for the market-data adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Twelve Data bar interval, e.g. `1h`.
    #[serde(default = "default_twelvedata_interval")]
    pub twelvedata_interval: String,

    /// Number of bars requested from Twelve Data.
    #[serde(default = "default_twelvedata_outputsize")]
    pub twelvedata_outputsize: usize,

    /// Days of history requested from CoinGecko. Two or more yields hourly
    /// points; one day is too short for the default MACD warm-up.
    #[serde(default = "default_coingecko_days")]
    pub coingecko_days: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            twelvedata_interval: default_twelvedata_interval(),
            twelvedata_outputsize: default_twelvedata_outputsize(),
            coingecko_days: default_coingecko_days(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// =============================================================================
// SignalConfig
// =============================================================================

/// Top-level configuration for one pipeline process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Instruments evaluated on every run, in report order.
    #[serde(default = "default_instruments")]
    pub instruments: Vec<Instrument>,

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub rule_set: RuleSet,

    /// Named preset that replaces `rule_set` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<RuleProfile>,

    /// TP/SL offset model per asset class.
    #[serde(default)]
    pub offsets: OffsetProfiles,

    /// Refuse series whose closes never move instead of only flagging them.
    #[serde(default)]
    pub reject_flat_series: bool,

    #[serde(default)]
    pub sources: SourceSettings,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            instruments: default_instruments(),
            indicators: IndicatorParams::default(),
            rule_set: RuleSet::default(),
            profile: None,
            offsets: OffsetProfiles::default(),
            reject_flat_series: false,
            sources: SourceSettings::default(),
        }
    }
}

impl SignalConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read signal config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse signal config from {}", path.display()))?;
        let config = config.apply_profile();

        info!(
            path = %path.display(),
            instruments = config.instruments.len(),
            mode = config.rule_set.mode_name(),
            "signal config loaded"
        );

        Ok(config)
    }

    /// Expand `profile`, if any, into `rule_set`.
    pub fn apply_profile(mut self) -> Self {
        if let Some(profile) = self.profile {
            info!(%profile, "rule profile selected");
            self.rule_set = profile.rule_set();
        }
        self
    }

    /// Replace the instrument list with a `class:id` comma-separated list,
    /// e.g. `forex:EURUSD,crypto:bitcoin`.
    pub fn with_instruments_spec(mut self, spec: &str) -> Result<Self> {
        let instruments = parse_instruments(spec)?;
        if !instruments.is_empty() {
            self.instruments = instruments;
        }
        Ok(self)
    }

    /// Series length every instrument must reach under the configured rules.
    pub fn minimum_length(&self) -> usize {
        self.indicators.minimum_length(&self.rule_set.enabled())
    }

    /// Check the whole configuration once, before the pipeline starts.
    pub fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            bail!("no instruments configured");
        }
        if let Some(bad) = self.instruments.iter().find(|i| i.id.trim().is_empty()) {
            bail!("instrument with empty id ({})", bad.class);
        }
        self.indicators.validate()?;
        self.rule_set.validate().map_err(anyhow::Error::msg)?;
        self.offsets.forex.validate().map_err(anyhow::Error::msg).context("forex offsets")?;
        self.offsets.crypto.validate().map_err(anyhow::Error::msg).context("crypto offsets")?;
        let has = |class: AssetClass| self.instruments.iter().any(|i| i.class == class);
        if has(AssetClass::Forex) && self.sources.twelvedata_outputsize < self.minimum_length() {
            bail!(
                "twelvedata_outputsize {} is below the {} bars the rule set needs",
                self.sources.twelvedata_outputsize,
                self.minimum_length()
            );
        }
        if has(AssetClass::Crypto) {
            if !(2..=COINGECKO_HOURLY_MAX_DAYS).contains(&self.sources.coingecko_days) {
                bail!(
                    "coingecko_days must be within 2..={COINGECKO_HOURLY_MAX_DAYS} for hourly points, got {}",
                    self.sources.coingecko_days
                );
            }
            let points = self.sources.coingecko_days as usize * 24;
            if points < self.minimum_length() {
                bail!(
                    "coingecko_days {} yields about {points} hourly points, below the {} bars the rule set needs",
                    self.sources.coingecko_days,
                    self.minimum_length()
                );
            }
        }
        Ok(())
    }
}

fn parse_instruments(spec: &str) -> Result<Vec<Instrument>> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (class, id) = entry
                .split_once(':')
                .with_context(|| format!("instrument '{entry}' must look like class:id"))?;
            let class: AssetClass = class.parse().map_err(anyhow::Error::msg)?;
            let id = id.trim();
            let id = match class {
                AssetClass::Forex => id.to_uppercase(),
                AssetClass::Crypto => id.to_lowercase(),
            };
            Ok(Instrument { id, class })
        })
        .collect()
}
