//! The `currency_converter` tool as exposed to an agent framework.
//!
//! [`ConversionExecutor::execute`] always resolves to the JSON text of a
//! [`ToolResponse`]; failures never escape it.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::core::config::AppConfig;
use crate::core::conversion::{self, ConversionRequest, ConversionResult, ToolResponse};
use crate::core::error::ConversionError;
use crate::core::progress::{self, Notification, ProgressCallback};
use crate::core::rates::ExchangeRateProvider;
use crate::providers::ExchangeRateApiProvider;

pub const TOOL_NAME: &str = "currency_converter";
pub const TOOL_DESCRIPTION: &str =
    "Convert an amount between two currencies using the latest exchange rates";

/// Registration metadata consumed by the hosting framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn currency_converter() -> Self {
        ToolDescriptor {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "amount": {
                        "type": "number",
                        "description": "The amount to convert"
                    },
                    "fromCurrency": {
                        "type": "string",
                        "description": "Currency code to convert from, e.g. USD"
                    },
                    "toCurrency": {
                        "type": "string",
                        "description": "Currency code to convert to, e.g. EUR"
                    }
                },
                "required": ["amount", "fromCurrency", "toCurrency"],
                "additionalProperties": false
            }),
        }
    }
}

/// Arguments as sent by the framework. Mirrors [`ToolDescriptor::parameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConversionArgs {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
}

impl ConversionArgs {
    pub fn into_request(self) -> ConversionRequest {
        ConversionRequest::new(self.amount, &self.from_currency, &self.to_currency)
    }
}

#[derive(Clone)]
pub struct ConversionExecutor {
    provider: Arc<dyn ExchangeRateProvider>,
}

impl ConversionExecutor {
    pub fn new(provider: Arc<dyn ExchangeRateProvider>) -> Self {
        ConversionExecutor { provider }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider =
            ExchangeRateApiProvider::with_config(&config.providers.exchangerate, &config.user_agent)?;
        Ok(Self::new(Arc::new(provider)))
    }

    /// Runs one conversion and returns the serialized [`ToolResponse`].
    pub async fn execute(&self, request: ConversionRequest) -> String {
        self.respond(request).await.to_json()
    }

    /// Like [`execute`](Self::execute), without the final serialization.
    pub async fn respond(&self, request: ConversionRequest) -> ToolResponse {
        match self.try_convert(&request).await {
            Ok(result) => ToolResponse::Data(result),
            Err(e) => {
                error!(
                    error = %e,
                    from = %request.from_currency,
                    to = %request.to_currency,
                    "Currency conversion failed"
                );
                e.into()
            }
        }
    }

    /// Decodes framework arguments, then behaves like [`execute`](Self::execute).
    pub async fn invoke(&self, args: Value, progress: Option<ProgressCallback>) -> String {
        let args: ConversionArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(e) => {
                let err = ConversionError::InvalidArguments(e.to_string());
                error!(error = %err, "Rejected tool invocation");
                return ToolResponse::from(err).to_json();
            }
        };

        let mut request = args.into_request();
        request.progress = progress;
        self.execute(request).await
    }

    #[instrument(name = "CurrencyConversion", skip(self, request), fields(request = ?request))]
    async fn try_convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        if let Some(callback) = &request.progress {
            progress::notify(callback, &Notification::fetching_rates());
        }

        let snapshot = self.provider.latest_rates(&request.from_currency).await?;
        debug!(rates = snapshot.rates.len(), "Fetched exchange rates");

        conversion::convert(
            request.amount,
            &request.from_currency,
            &request.to_currency,
            &snapshot,
            Utc::now(),
        )
    }
}
