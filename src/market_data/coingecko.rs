// =============================================================================
// CoinGecko REST client — crypto closing prices
// =============================================================================
//
// GET /coins/{id}/market_chart?vs_currency=usd&days=N
//
// `prices` is a list of `[timestamp_ms, price]` pairs, oldest first.  For
// 2..=90 days the sampling is hourly.  Only closes are available, so every
// bar gets a synthetic high/low range downstream.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::SourceSettings;
use crate::errors::FetchError;
use crate::market_data::series::PriceObservation;
use crate::market_data::source::MarketDataSource;
use crate::types::Instrument;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

/// CoinGecko market-chart client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    days: u32,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build CoinGecko HTTP client")?;

        debug!(days = settings.coingecko_days, "CoinGeckoClient initialised (base_url={BASE_URL})");

        Ok(Self {
            days: settings.coingecko_days,
            client,
        })
    }

    #[instrument(skip(self), fields(coin = %instrument.id), name = "coingecko::market_chart")]
    pub async fn market_chart(&self, instrument: &Instrument) -> Result<Vec<PriceObservation>, FetchError> {
        let url = format!("{}/coins/{}/market_chart", BASE_URL, instrument.id);
        let days = self.days.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[("vs_currency", "usd"), ("days", days.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Http {
                instrument: instrument.id.clone(),
                source,
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| FetchError::Http {
            instrument: instrument.id.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                instrument: instrument.id.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let observations = parse_market_chart(&instrument.id, &body)?;
        debug!(points = observations.len(), "market chart received");
        Ok(observations)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn fetch_series(&self, instrument: &Instrument) -> Result<Vec<PriceObservation>, FetchError> {
        self.market_chart(instrument).await
    }
}

/// Decode a `/market_chart` body into close-only observations.
pub fn parse_market_chart(instrument: &str, body: &str) -> Result<Vec<PriceObservation>, FetchError> {
    let parsed: MarketChartResponse = serde_json::from_str(body).map_err(|e| FetchError::Malformed {
        instrument: instrument.to_string(),
        detail: e.to_string(),
    })?;

    if parsed.prices.is_empty() {
        return Err(FetchError::Empty {
            instrument: instrument.to_string(),
            detail: "prices missing".to_string(),
        });
    }

    Ok(parsed
        .prices
        .into_iter()
        .map(|(ts, price)| PriceObservation::close_only(ts as i64, price))
        .collect())
}
