// =============================================================================
// Pipeline runner — observations → series → snapshot → verdict → report
// =============================================================================
//
// `evaluate_instrument` is pure and synchronous.  `run` fans the fetches out
// concurrently, keeps results in configured instrument order, and hands the
// assembled report to the notifier exactly once.  Nothing inside a run is
// fatal: every per-instrument failure becomes a HOLD result carrying the
// reason.
// =============================================================================

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument as _};
use uuid::Uuid;

use crate::config::SignalConfig;
use crate::errors::DeliveryError;
use crate::market_data::{MarketDataSource, PriceObservation, PriceSeries};
use crate::notify::Notifier;
use crate::report::{self, RunSummary};
use crate::risk::compute_levels;
use crate::signals::{evaluate, IndicatorSnapshot};
use crate::types::{Direction, Instrument, InstrumentResult, TradeVerdict};

/// Everything one run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub results: Vec<InstrumentResult>,
    pub report: String,
    pub summary: RunSummary,
    /// The report stays valid when delivery fails; retrying is up to the caller.
    pub delivery: Result<(), DeliveryError>,
}

/// JSON line written to the log for each actionable result.
#[derive(Debug, Serialize)]
struct SignalRecord<'a> {
    run_id: &'a Uuid,
    #[serde(flatten)]
    result: &'a InstrumentResult,
}

/// Run one instrument through the core pipeline.
pub fn evaluate_instrument(config: &SignalConfig, instrument: &Instrument, observations: &[PriceObservation]) -> InstrumentResult {
    let mut errors = Vec::new();

    // Latest usable close, so rejected series still report where price was.
    let last_seen = observations
        .iter()
        .rev()
        .map(|o| o.close)
        .find(|c| c.is_finite() && *c > 0.0)
        .unwrap_or(0.0);

    let series = match PriceSeries::build(observations, config.minimum_length()) {
        Ok(series) => series,
        Err(e) => {
            warn!(instrument = %instrument, error = %e, "series rejected");
            return InstrumentResult::failed_at(instrument.clone(), last_seen, e.to_string());
        }
    };

    let series = if config.reject_flat_series {
        match series.reject_flat() {
            Ok(series) => series,
            Err(e) => {
                warn!(instrument = %instrument, error = %e, "flat series rejected");
                return InstrumentResult::failed_at(instrument.clone(), last_seen, e.to_string());
            }
        }
    } else {
        if series.is_flat() {
            let note = format!("FlatSeries: all {} closes are identical (flagged, evaluated anyway)", series.len());
            warn!(instrument = %instrument, "{note}");
            errors.push(note);
        }
        series
    };

    // Non-empty after a successful build.
    let Some(price) = series.last_close() else {
        return InstrumentResult::failed(instrument.clone(), "InsufficientData: empty series");
    };

    let snapshot = IndicatorSnapshot::compute(&series, &config.indicators, &config.rule_set.enabled());
    let evaluation = evaluate(&snapshot, price, &config.rule_set);
    let levels = compute_levels(
        evaluation.direction,
        price,
        config.offsets.for_class(instrument.class),
        snapshot.atr,
    );
    if evaluation.direction != Direction::Hold && levels.is_none() {
        let note = format!(
            "RiskLevels: {} at {price} would put a level at or below zero, holding instead",
            evaluation.direction
        );
        warn!(instrument = %instrument, "{note}");
        errors.push(note);
    }

    debug!(
        instrument = %instrument,
        bars = series.len(),
        synthetic_ranges = series.synthetic_ranges(),
        votes = %evaluation.vote_summary(),
        buy_weight = evaluation.buy_weight,
        sell_weight = evaluation.sell_weight,
        "instrument evaluated"
    );

    InstrumentResult {
        instrument: instrument.clone(),
        verdict: TradeVerdict::with_levels(evaluation.direction, price, levels),
        errors,
    }
}

/// Fetch, evaluate and report every configured instrument, then deliver.
pub async fn run(config: &SignalConfig, source: &dyn MarketDataSource, notifier: &dyn Notifier) -> RunOutcome {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", run_id = %run_id, mode = config.rule_set.mode_name());

    async move {
        info!(instruments = config.instruments.len(), "run started");

        let results: Vec<InstrumentResult> = join_all(config.instruments.iter().map(|instrument| async move {
            match source.fetch_series(instrument).await {
                Ok(observations) => evaluate_instrument(config, instrument, &observations),
                Err(e) => {
                    warn!(instrument = %instrument, error = %e, "fetch failed");
                    InstrumentResult::failed(instrument.clone(), e.to_string())
                }
            }
        }))
        .await;

        for result in results.iter().filter(|r| r.is_actionable()) {
            let record = SignalRecord {
                run_id: &run_id,
                result,
            };
            match serde_json::to_string(&record) {
                Ok(line) => info!(instrument = %result.instrument, direction = %result.verdict.direction, "signal {line}"),
                Err(e) => warn!(error = %e, "failed to serialise signal record"),
            }
        }

        let report = report::assemble(&results);
        let summary = report::summarize(&results);
        info!(summary = %summary, "run evaluated");

        let delivery = notifier.deliver(&report).await;
        match &delivery {
            Ok(()) => info!("report delivered"),
            Err(e) => warn!(error = %e, "report delivery failed"),
        }

        RunOutcome {
            run_id,
            results,
            report,
            summary,
            delivery,
        }
    }
    .instrument(span)
    .await
}
