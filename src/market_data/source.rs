// =============================================================================
// Market-data collaborator boundary
// =============================================================================
//
// The pipeline only needs `fetch_series(instrument)`: a chronological list of
// observations or a typed failure, within the adapter's request timeout.  Any
// failure is recorded on that instrument's result and the run moves on.

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::market_data::coingecko::CoinGeckoClient;
use crate::market_data::series::PriceObservation;
use crate::market_data::twelvedata::TwelveDataClient;
use crate::types::{AssetClass, Instrument};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Oldest-first observations for `instrument`.
    async fn fetch_series(&self, instrument: &Instrument) -> Result<Vec<PriceObservation>, FetchError>;
}

/// Dispatches forex instruments to Twelve Data and crypto to CoinGecko.
/// A class without a configured client fails with `Unsupported`.
pub struct RoutingSource {
    forex: Option<TwelveDataClient>,
    crypto: Option<CoinGeckoClient>,
}

impl RoutingSource {
    pub fn new(forex: Option<TwelveDataClient>, crypto: Option<CoinGeckoClient>) -> Self {
        Self { forex, crypto }
    }
}

#[async_trait]
impl MarketDataSource for RoutingSource {
    async fn fetch_series(&self, instrument: &Instrument) -> Result<Vec<PriceObservation>, FetchError> {
        match instrument.class {
            AssetClass::Forex => match &self.forex {
                Some(client) => client.fetch_series(instrument).await,
                None => Err(FetchError::Unsupported(format!("{instrument} (FOREX_API_KEY not set)"))),
            },
            AssetClass::Crypto => match &self.crypto {
                Some(client) => client.fetch_series(instrument).await,
                None => Err(FetchError::Unsupported(instrument.to_string())),
            },
        }
    }
}
