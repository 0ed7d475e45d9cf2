//! Exchange rate abstractions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::ConversionError;

/// Rates table for one base currency as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Unix seconds of the provider's last update.
    #[serde(default)]
    pub time_last_updated: Option<i64>,
    pub rates: HashMap<String, f64>,
}

impl ExchangeRateSnapshot {
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Fetches the latest rates with `base` as the base currency.
    async fn latest_rates(&self, base: &str) -> Result<ExchangeRateSnapshot, ConversionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_optional_fields() {
        let snapshot: ExchangeRateSnapshot =
            serde_json::from_str(r#"{"rates": {"EUR": 0.92, "INR": 83.1}}"#).unwrap();
        assert!(snapshot.provider.is_none());
        assert!(snapshot.time_last_updated.is_none());
        assert_eq!(snapshot.rate_for("EUR"), Some(0.92));
        assert_eq!(snapshot.rate_for("eur"), None);
    }

    #[test]
    fn test_snapshot_requires_rates() {
        let result = serde_json::from_str::<ExchangeRateSnapshot>(
            r#"{"provider": "https://www.exchangerate-api.com", "base": "USD"}"#,
        );
        assert!(result.is_err());
    }
}
