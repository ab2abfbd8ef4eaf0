pub mod coingecko;
pub mod series;
pub mod source;
pub mod twelvedata;

pub use coingecko::CoinGeckoClient;
pub use series::{Bar, PriceObservation, PriceSeries};
pub use source::{MarketDataSource, RoutingSource};
pub use twelvedata::TwelveDataClient;

#[cfg(test)]
pub use source::MockMarketDataSource;
