use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::core::config::{AppConfig, ExchangeRateProviderConfig};
use crate::core::error::ConversionError;
use crate::core::rates::{ExchangeRateProvider, ExchangeRateSnapshot};

/// Client for the open `v4/latest/{base}` endpoint of ExchangeRate-API.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let config = ExchangeRateProviderConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        Self::with_config(&config, &AppConfig::default().user_agent)
    }

    pub fn with_config(config: &ExchangeRateProviderConfig, user_agent: &str) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(ExchangeRateApiProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn latest_url(&self, base: &str) -> String {
        format!("{}/v4/latest/{}", self.base_url, base)
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base))]
    async fn latest_rates(&self, base: &str) -> Result<ExchangeRateSnapshot, ConversionError> {
        let url = self.latest_url(base);
        debug!("Requesting exchange rates from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!(%status, "Received exchange rate response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConversionError::from_status(status, &body));
        }

        let text = response.text().await?;
        match serde_json::from_str::<ExchangeRateSnapshot>(&text) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                error!(
                    error = ?e,
                    response = %text,
                    "Failed to parse exchange rate response"
                );
                Err(ConversionError::FetchFailed)
            }
        }
    }
}
