// =============================================================================
// Notification collaborator
// =============================================================================
//
// The runner calls `deliver` exactly once per run with the assembled report.
// A delivery failure is handed back to the caller; the report stays valid.

pub mod telegram;

use async_trait::async_trait;
use tracing::info;

use crate::errors::DeliveryError;

pub use telegram::TelegramNotifier;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Writes the report to the log. Used when no chat credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        info!(channel = "log", chars = text.len(), "report:\n{text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier.deliver("No trading signals this run.").await.is_ok());
        assert!(LogNotifier.deliver("").await.is_ok());
    }
}
