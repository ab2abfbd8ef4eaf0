// =============================================================================
// Twelve Data REST client — hourly forex candles
// =============================================================================
//
// GET /time_series?symbol=EUR/USD&interval=1h&outputsize=50&apikey=...
//
// The response lists candles newest first with every number encoded as a
// string.  Errors come back as HTTP 200 with `"status": "error"`.
//
// SECURITY: the API key travels in the query string, so request URLs are
// never logged.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::SourceSettings;
use crate::errors::FetchError;
use crate::market_data::series::PriceObservation;
use crate::market_data::source::MarketDataSource;
use crate::types::Instrument;

const BASE_URL: &str = "https://api.twelvedata.com";

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Option<Vec<RawCandle>>,
}

#[derive(Debug, Deserialize)]
struct RawCandle {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
}

/// Twelve Data time-series client.
#[derive(Clone)]
pub struct TwelveDataClient {
    api_key: String,
    interval: String,
    outputsize: usize,
    client: reqwest::Client,
}

impl TwelveDataClient {
    pub fn new(api_key: impl Into<String>, settings: &SourceSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build Twelve Data HTTP client")?;

        debug!(
            interval = %settings.twelvedata_interval,
            outputsize = settings.twelvedata_outputsize,
            "TwelveDataClient initialised (base_url={BASE_URL})"
        );

        Ok(Self {
            api_key: api_key.into(),
            interval: settings.twelvedata_interval.clone(),
            outputsize: settings.twelvedata_outputsize,
            client,
        })
    }

    /// `GET /time_series` for one pair.
    #[instrument(skip(self), fields(pair = %instrument.id), name = "twelvedata::time_series")]
    pub async fn time_series(&self, instrument: &Instrument) -> Result<Vec<PriceObservation>, FetchError> {
        let symbol = provider_symbol(&instrument.id);
        let outputsize = self.outputsize.to_string();
        let url = format!("{}/time_series", BASE_URL);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", self.interval.as_str()),
                ("outputsize", outputsize.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Http {
                instrument: instrument.id.clone(),
                source: source.without_url(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| FetchError::Http {
            instrument: instrument.id.clone(),
            source: source.without_url(),
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                instrument: instrument.id.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let observations = parse_time_series(&instrument.id, &body)?;
        debug!(bars = observations.len(), "time series received");
        Ok(observations)
    }
}

#[async_trait]
impl MarketDataSource for TwelveDataClient {
    async fn fetch_series(&self, instrument: &Instrument) -> Result<Vec<PriceObservation>, FetchError> {
        self.time_series(instrument).await
    }
}

/// `EURUSD` -> `EUR/USD`; anything else passes through unchanged.
pub fn provider_symbol(id: &str) -> String {
    if id.len() == 6 && id.chars().all(|c| c.is_ascii_alphabetic()) {
        format!("{}/{}", &id[..3], &id[3..]).to_uppercase()
    } else {
        id.to_string()
    }
}

/// Decode a `/time_series` body into oldest-first observations.
pub fn parse_time_series(instrument: &str, body: &str) -> Result<Vec<PriceObservation>, FetchError> {
    let malformed = |detail: String| FetchError::Malformed {
        instrument: instrument.to_string(),
        detail,
    };

    let parsed: TimeSeriesResponse = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

    if parsed.status.as_deref() == Some("error") {
        return Err(FetchError::Empty {
            instrument: instrument.to_string(),
            detail: parsed.message.unwrap_or_else(|| "provider returned status=error".to_string()),
        });
    }

    let values = match parsed.values {
        Some(values) if !values.is_empty() => values,
        _ => {
            return Err(FetchError::Empty {
                instrument: instrument.to_string(),
                detail: "values missing".to_string(),
            })
        }
    };

    let mut observations = values
        .iter()
        .map(|raw| {
            let number = |field: &str, value: &str| {
                value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| malformed(format!("{field} '{value}' at {} is not a number", raw.datetime)))
            };
            Ok(PriceObservation::candle(
                parse_datetime(&raw.datetime).ok_or_else(|| malformed(format!("bad datetime '{}'", raw.datetime)))?,
                number("open", &raw.open)?,
                number("high", &raw.high)?,
                number("low", &raw.low)?,
                number("close", &raw.close)?,
            ))
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    // Newest first on the wire.
    observations.reverse();
    Ok(observations)
}

/// Milliseconds since epoch for `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.
fn parse_datetime(s: &str) -> Option<i64> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "meta": {"symbol": "EUR/USD", "interval": "1h"},
        "values": [
            {"datetime": "2024-05-02 12:00:00", "open": "1.07010", "high": "1.07100", "low": "1.06950", "close": "1.07080"},
            {"datetime": "2024-05-02 11:00:00", "open": "1.06900", "high": "1.07050", "low": "1.06880", "close": "1.07010"},
            {"datetime": "2024-05-02 10:00:00", "open": "1.06850", "high": "1.06920", "low": "1.06800", "close": "1.06900"}
        ],
        "status": "ok"
    }"#;

    #[test]
    fn provider_symbol_inserts_slash() {
        assert_eq!(provider_symbol("EURUSD"), "EUR/USD");
        assert_eq!(provider_symbol("gbpjpy"), "GBP/JPY");
        assert_eq!(provider_symbol("EUR/USD"), "EUR/USD");
        assert_eq!(provider_symbol("XAUUSD1"), "XAUUSD1");
    }

    #[test]
    fn parse_reverses_into_chronological_order() {
        let obs = parse_time_series("EURUSD", FIXTURE).unwrap();
        assert_eq!(obs.len(), 3);
        assert!(obs.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(obs[0].close, 1.069);
        assert_eq!(obs[2].close, 1.0708);
        assert_eq!(obs[2].high, Some(1.071));
        assert_eq!(obs[2].low, Some(1.0695));
    }

    #[test]
    fn parse_datetime_formats() {
        assert_eq!(parse_datetime("1970-01-01 00:00:01"), Some(1_000));
        assert_eq!(parse_datetime("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn provider_error_is_empty_fetch() {
        let body = r#"{"code": 401, "message": "apikey parameter is incorrect", "status": "error"}"#;
        let err = parse_time_series("EURUSD", body).unwrap_err();
        assert!(matches!(err, FetchError::Empty { .. }));
        assert!(err.to_string().contains("apikey parameter is incorrect"));
    }

    #[test]
    fn missing_values_is_empty_fetch() {
        let err = parse_time_series("EURUSD", r#"{"status": "ok"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Empty { .. }));
        let err = parse_time_series("EURUSD", r#"{"values": []}"#).unwrap_err();
        assert!(matches!(err, FetchError::Empty { .. }));
    }

    #[test]
    fn non_numeric_fields_are_malformed() {
        let body = r#"{"values": [{"datetime": "2024-05-02 10:00:00", "open": "x", "high": "1", "low": "1", "close": "1"}]}"#;
        assert!(matches!(
            parse_time_series("EURUSD", body),
            Err(FetchError::Malformed { .. })
        ));
        assert!(matches!(
            parse_time_series("EURUSD", "not json"),
            Err(FetchError::Malformed { .. })
        ));
    }
}
