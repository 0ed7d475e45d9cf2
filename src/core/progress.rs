//! Progress notifications emitted while a conversion runs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const FETCH_MESSAGE: &str = "Fetching exchange rates...";
pub const FETCH_PROGRESS: u8 = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub message: String,
    pub progress: u8,
}

/// Side channel message, serialized as `{"type": "progress", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Notification {
    Progress(ProgressUpdate),
}

impl Notification {
    pub fn progress(message: &str, progress: u8) -> Self {
        Notification::Progress(ProgressUpdate {
            message: message.to_string(),
            progress,
        })
    }

    /// The one notification sent before rates are requested.
    pub fn fetching_rates() -> Self {
        Self::progress(FETCH_MESSAGE, FETCH_PROGRESS)
    }
}

pub type ProgressCallback = Arc<dyn Fn(&Notification) -> anyhow::Result<()> + Send + Sync>;

/// Wraps a closure as a [`ProgressCallback`].
pub fn callback<F>(f: F) -> ProgressCallback
where
    F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Delivers `notification` on a best-effort basis; a failing callback is
/// logged and otherwise ignored.
pub fn notify(callback: &ProgressCallback, notification: &Notification) {
    if let Err(e) = callback(notification) {
        warn!(error = %e, "Progress callback failed");
    }
}
