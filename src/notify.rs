//! Usage notification boundary
//!
//! The outbound webhook is an external collaborator; [`LogNotifier`]
//! records the event in the application log instead.

use async_trait::async_trait;
use thiserror::Error;

use crate::logger;

#[derive(Debug, Error)]
#[error("usage notification failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait UsageNotifier: Send + Sync {
    /// Report that a save was issued to `player_name`.
    async fn notify(&self, player_name: &str, ip: Option<&str>) -> Result<(), NotifyError>;
}

pub struct LogNotifier;

#[async_trait]
impl UsageNotifier for LogNotifier {
    async fn notify(&self, player_name: &str, ip: Option<&str>) -> Result<(), NotifyError> {
        logger::log_usage_notified(player_name, ip);
        Ok(())
    }
}
