// =============================================================================
// Signal Notifier — Main Entry Point
// =============================================================================
//
// One run = fetch every configured instrument, evaluate, send one report.
// Without SIGNAL_RUN_INTERVAL_SECS the process runs once and exits (cron
// style); with it, runs repeat on that interval until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod config;
mod errors;
mod indicators;
mod market_data;
mod notify;
mod pipeline;
mod report;
mod risk;
mod signals;
mod types;

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::SignalConfig;
use crate::market_data::{CoinGeckoClient, RoutingSource, TwelveDataClient};
use crate::notify::{LogNotifier, Notifier, TelegramNotifier};

const DEFAULT_CONFIG_PATH: &str = "signal_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Signal Notifier starting up");

    let config_path = std::env::var("SIGNAL_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = SignalConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        SignalConfig::default()
    });

    // Override instruments from env if available.
    if let Ok(spec) = std::env::var("SIGNAL_INSTRUMENTS") {
        config = config
            .with_instruments_spec(&spec)
            .context("invalid SIGNAL_INSTRUMENTS")?;
    }
    config.validate().context("signal config rejected")?;

    info!(
        instruments = config.instruments.len(),
        mode = config.rule_set.mode_name(),
        minimum_bars = config.minimum_length(),
        "Configuration validated"
    );

    // ── 2. Collaborators ─────────────────────────────────────────────────
    let forex = match std::env::var("FOREX_API_KEY").ok().filter(|k| !k.trim().is_empty()) {
        Some(key) => Some(TwelveDataClient::new(key, &config.sources)?),
        None => {
            warn!("FOREX_API_KEY not set — forex instruments will be recorded as failed");
            None
        }
    };
    let crypto = Some(CoinGeckoClient::new(&config.sources)?);
    let source = RoutingSource::new(forex, crypto);

    let notifier: Box<dyn Notifier> = match (std::env::var("TELEGRAM_TOKEN"), std::env::var("TELEGRAM_CHAT_ID")) {
        (Ok(token), Ok(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
            info!("Delivering reports to Telegram");
            Box::new(TelegramNotifier::new(token, chat_id, config.sources.request_timeout_secs)?)
        }
        _ => {
            warn!("Telegram credentials not set — reports go to the log only");
            Box::new(LogNotifier)
        }
    };

    // ── 3. Run ───────────────────────────────────────────────────────────
    let interval_secs = match std::env::var("SIGNAL_RUN_INTERVAL_SECS") {
        Ok(raw) => Some(
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("SIGNAL_RUN_INTERVAL_SECS must be a whole number of seconds, got '{raw}'"))?,
        ),
        Err(_) => None,
    };

    let Some(secs) = interval_secs.filter(|s| *s > 0) else {
        let outcome = pipeline::run(&config, &source, notifier.as_ref()).await;
        log_outcome(&outcome);
        return outcome.delivery.context("report could not be delivered");
    };

    info!(every_secs = secs, "Scheduled mode. Press Ctrl+C to stop.");
    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let outcome = pipeline::run(&config, &source, notifier.as_ref()).await;
                log_outcome(&outcome);
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Shutdown signal received — stopping");
                break;
            }
        }
    }

    info!("Signal Notifier shut down complete.");
    Ok(())
}

fn log_outcome(outcome: &pipeline::RunOutcome) {
    let degraded = outcome.results.iter().filter(|r| !r.errors.is_empty()).count();
    info!(
        run_id = %outcome.run_id,
        summary = %outcome.summary,
        instruments = outcome.results.len(),
        degraded,
        "Run complete"
    );
    // Undelivered reports are kept in the log so the run is not lost.
    if outcome.delivery.is_err() {
        warn!(run_id = %outcome.run_id, "Undelivered report:\n{}", outcome.report);
    }
}
