//! Failure kinds of a single conversion attempt

use serde_json::Value;
use thiserror::Error;

/// Message used when a failure carries no text of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred while converting currency";

#[derive(Debug, Error)]
pub enum ConversionError {
    /// Provider answered, but without a usable rates table.
    #[error("Failed to fetch exchange rates.")]
    FetchFailed,

    /// Target code is not a key of the fetched rates table.
    #[error("Conversion to {0} is not supported")]
    UnsupportedCurrency(String),

    /// Provider answered with a non-success status.
    #[error("{message}")]
    Provider {
        message: String,
        details: Option<Value>,
    },

    /// No response at all (connect, DNS, timeout, broken body).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ConversionError {
    /// Builds a [`ConversionError::Provider`] from an HTTP status and the raw
    /// response body. JSON bodies are kept structured, anything else is kept
    /// as a string and an empty body carries no details.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let details = if body.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(body)
                    .unwrap_or_else(|_| Value::String(body.to_string())),
            )
        };

        ConversionError::Provider {
            message: format!("Request failed with status code {}", status.as_u16()),
            details,
        }
    }

    /// Provider error body, only present for [`ConversionError::Provider`].
    pub fn details(&self) -> Option<&Value> {
        match self {
            ConversionError::Provider { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Human readable message, never empty.
    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}
