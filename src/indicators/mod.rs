// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the signal
// evaluator votes on.  Every function returns a `Vec` aligned to the trailing
// end of its input: the output has `len(input) - warmup + 1` elements and the
// first `warmup - 1` inputs produce nothing.  Too-short input or a zero period
// yields an empty `Vec`, never a panic.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use adx::{calculate_adx, AdxValue};
pub use atr::calculate_atr;
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdValue};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, StochasticValue};
