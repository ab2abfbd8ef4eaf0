// =============================================================================
// Signals Module
// =============================================================================
//
// From indicator values to a direction:
// - Indicator snapshot (latest value per enabled indicator)
// - Rule sets (consensus / strict-AND, named thresholds, weights, profiles)
// - Evaluator (per-indicator votes and their fusion)

pub mod evaluator;
pub mod rules;
pub mod snapshot;

pub use evaluator::evaluate;
pub use rules::{Indicator, RuleProfile, RuleSet};
pub use snapshot::IndicatorSnapshot;
