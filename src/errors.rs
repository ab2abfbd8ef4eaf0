// =============================================================================
// Error taxonomy for the signal pipeline
// =============================================================================
//
// Series and collaborator failures are per-instrument and never fatal to a
// run: the runner stringifies them onto `InstrumentResult::errors` and the
// verdict degrades to HOLD.  Indicator abstention is not an error at all.

use thiserror::Error;

/// Reasons a raw observation sequence cannot become a `PriceSeries`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("InsufficientData: {available} observations, {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("InvalidObservation: close at index {index} is {value} (must be finite and positive)")]
    InvalidObservation { index: usize, value: f64 },

    #[error("OutOfOrder: timestamp {current} at index {index} does not follow {previous}")]
    OutOfOrder {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("FlatSeries: all {len} closes equal {price}")]
    FlatSeries { len: usize, price: f64 },
}

/// Failure reported by a market-data collaborator.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("UpstreamFetchFailure: request for {instrument} failed: {source}")]
    Http {
        instrument: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("UpstreamFetchFailure: {instrument} returned status {status}: {body}")]
    Status {
        instrument: String,
        status: u16,
        body: String,
    },

    #[error("UpstreamFetchFailure: {instrument} returned no data ({detail})")]
    Empty { instrument: String, detail: String },

    #[error("UpstreamFetchFailure: malformed payload for {instrument}: {detail}")]
    Malformed { instrument: String, detail: String },

    #[error("UpstreamFetchFailure: no source configured for {0}")]
    Unsupported(String),
}

/// Failure reported by the notification collaborator.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("DeliveryFailure: request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DeliveryFailure: channel rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_both_counts() {
        let e = SeriesError::InsufficientData {
            available: 12,
            required: 35,
        };
        assert_eq!(e.to_string(), "InsufficientData: 12 observations, 35 required");
    }

    #[test]
    fn fetch_errors_are_tagged_as_upstream_failures() {
        let e = FetchError::Empty {
            instrument: "EURUSD".into(),
            detail: "values missing".into(),
        };
        assert!(e.to_string().starts_with("UpstreamFetchFailure"));
        assert!(FetchError::Unsupported("X".into()).to_string().contains('X'));
    }

    #[test]
    fn delivery_rejection_message() {
        let e = DeliveryError::Rejected {
            status: 401,
            body: "Unauthorized".into(),
        };
        assert!(e.to_string().starts_with("DeliveryFailure"));
        assert!(e.to_string().contains("401"));
    }
}
