//! Conversion request/result types and the pure conversion step

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::error;

use super::error::ConversionError;
use super::progress::ProgressCallback;
use super::rates::ExchangeRateSnapshot;

/// Provider name used when the rates payload does not name one.
pub const DEFAULT_PROVIDER_NAME: &str = "ExchangeRate-API";

const FALLBACK_RESPONSE_JSON: &str =
    r#"{"error":{"message":"An unexpected error occurred while converting currency","details":null}}"#;

#[derive(Clone)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub progress: Option<ProgressCallback>,
}

impl ConversionRequest {
    pub fn new(amount: f64, from_currency: &str, to_currency: &str) -> Self {
        ConversionRequest {
            amount,
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }
}

impl fmt::Debug for ConversionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRequest")
            .field("amount", &self.amount)
            .field("from_currency", &self.from_currency)
            .field("to_currency", &self.to_currency)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub equivalent_string: String,
    pub timestamp: String,
    pub last_updated: Option<String>,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub details: Option<Value>,
}

/// What the tool hands back to the agent framework: either `data` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResponse {
    Data(ConversionResult),
    Error(ErrorBody),
}

impl ToolResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResponse::Error(_))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialize tool response");
            FALLBACK_RESPONSE_JSON.to_string()
        })
    }
}

impl From<ConversionError> for ToolResponse {
    fn from(err: ConversionError) -> Self {
        ToolResponse::Error(ErrorBody {
            message: err.message(),
            details: err.details().cloned(),
        })
    }
}

impl From<Result<ConversionResult, ConversionError>> for ToolResponse {
    fn from(result: Result<ConversionResult, ConversionError>) -> Self {
        match result {
            Ok(data) => ToolResponse::Data(data),
            Err(e) => e.into(),
        }
    }
}

/// Rounds the exact binary value of `value` to two decimals, halves away
/// from zero. Non-finite values and magnitudes beyond `Decimal` pass through.
pub fn round2(value: f64) -> f64 {
    match Decimal::from_f64_retain(value) {
        Some(exact) => exact
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse()
            .unwrap_or(value),
        None => value,
    }
}

/// Shortest decimal form of `value`, so `92.0` renders as `92`. Magnitudes
/// of at least 1e21 or below 1e-6 switch to exponent form (`1e+21`, `1e-7`).
pub fn format_amount(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) && !value.is_nan() {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }

    format!("{value}")
}

fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Applies the rate for `to` from `snapshot` (fetched with `from` as base).
pub fn convert(
    amount: f64,
    from: &str,
    to: &str,
    snapshot: &ExchangeRateSnapshot,
    now: DateTime<Utc>,
) -> Result<ConversionResult, ConversionError> {
    let rate = snapshot
        .rate_for(to)
        .ok_or_else(|| ConversionError::UnsupportedCurrency(to.to_string()))?;

    let converted = round2(amount * rate);

    let last_updated = match snapshot.time_last_updated {
        Some(secs) => {
            let instant = Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
                anyhow::anyhow!("Invalid last update timestamp from provider: {secs}")
            })?;
            Some(iso_timestamp(instant))
        }
        None => None,
    };

    Ok(ConversionResult {
        amount: converted,
        from_currency: from.to_string(),
        to_currency: to.to_string(),
        rate,
        equivalent_string: format!(
            "{} {} = {} {}",
            format_amount(amount),
            from,
            format_amount(converted),
            to
        ),
        timestamp: iso_timestamp(now),
        last_updated,
        provider: snapshot
            .provider
            .clone()
            .unwrap_or_else(|| DEFAULT_PROVIDER_NAME.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn snapshot(rates: &[(&str, f64)]) -> ExchangeRateSnapshot {
        ExchangeRateSnapshot {
            provider: None,
            base: Some("USD".to_string()),
            date: None,
            time_last_updated: None,
            rates: rates
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(92.0), 92.0);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(-7.771), -7.77);
        // Stored just below the midpoint, so they round down.
        assert_eq!(round2(3.0 * 0.005), 0.01);
        assert_eq!(round2(9.0 * 0.005), 0.04);
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(1e30), 1e30);
    }

    #[test]
    fn test_format_amount_drops_trailing_zeros() {
        assert_eq!(format_amount(92.0), "92");
        assert_eq!(format_amount(92.5), "92.5");
        assert_eq!(format_amount(0.01), "0.01");
        assert_eq!(format_amount(-3.0), "-3");
        assert_eq!(format_amount(-0.0), "0");
    }

    #[test]
    fn test_format_amount_exponent_form() {
        assert_eq!(format_amount(1e21), "1e+21");
        assert_eq!(format_amount(1.5e22), "1.5e+22");
        assert_eq!(format_amount(-2e21), "-2e+21");
        assert_eq!(format_amount(1e-7), "1e-7");
        assert_eq!(format_amount(999999999999999900000.0), "999999999999999900000");
        assert_eq!(format_amount(0.000001), "0.000001");
        assert_eq!(format_amount(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_convert_usd_to_eur() {
        let result = convert(100.0, "USD", "EUR", &snapshot(&[("EUR", 0.92)]), fixed_now())
            .expect("conversion should succeed");

        assert_eq!(result.amount, 92.0);
        assert_eq!(result.rate, 0.92);
        assert_eq!(result.equivalent_string, "100 USD = 92 EUR");
        assert_eq!(result.timestamp, "2024-03-01T12:30:00.000Z");
        assert!(result.last_updated.is_none());
        assert_eq!(result.provider, DEFAULT_PROVIDER_NAME);
    }

    #[test]
    fn test_convert_uses_provider_metadata() {
        let mut rates = snapshot(&[("INR", 83.123)]);
        rates.provider = Some("https://www.exchangerate-api.com".to_string());
        rates.time_last_updated = Some(1_709_251_201);

        let result = convert(2.5, "USD", "INR", &rates, fixed_now()).unwrap();
        assert_eq!(result.amount, 207.81);
        assert_eq!(result.equivalent_string, "2.5 USD = 207.81 INR");
        assert_eq!(
            result.last_updated.as_deref(),
            Some("2024-03-01T00:00:01.000Z")
        );
        assert_eq!(result.provider, "https://www.exchangerate-api.com");
    }

    #[test]
    fn test_convert_sub_cent_rate() {
        let result =
            convert(3.0, "USD", "EUR", &snapshot(&[("EUR", 0.005)]), fixed_now()).unwrap();
        assert_eq!(result.amount, 0.01);
        assert_eq!(result.equivalent_string, "3 USD = 0.01 EUR");
    }

    #[test]
    fn test_convert_out_of_range_last_updated() {
        let mut rates = snapshot(&[("EUR", 0.92)]);
        rates.time_last_updated = Some(i64::MAX);

        let err = convert(1.0, "USD", "EUR", &rates, fixed_now()).unwrap_err();
        assert!(matches!(err, ConversionError::Unexpected(_)));

        let value: Value = serde_json::from_str(&ToolResponse::from(err).to_json()).unwrap();
        assert!(value.get("data").is_none());
        assert!(
            value["error"]["message"]
                .as_str()
                .unwrap()
                .contains("Invalid last update timestamp")
        );
        assert!(value["error"]["details"].is_null());
    }

    #[test]
    fn test_convert_unsupported_target() {
        let err = convert(1.0, "USD", "XXX", &snapshot(&[("EUR", 0.92)]), fixed_now())
            .unwrap_err();
        assert_eq!(err.message(), "Conversion to XXX is not supported");
    }

    #[test]
    fn test_convert_never_inverts_rates() {
        // The base currency is not a key of its own table here.
        let err = convert(1.0, "USD", "USD", &snapshot(&[("EUR", 0.92)]), fixed_now())
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedCurrency(code) if code == "USD"));
    }

    #[test]
    fn test_convert_negative_and_zero_amounts() {
        let rates = snapshot(&[("EUR", 0.92)]);
        let result = convert(-10.0, "USD", "EUR", &rates, fixed_now()).unwrap();
        assert_eq!(result.amount, -9.2);
        assert_eq!(result.equivalent_string, "-10 USD = -9.2 EUR");

        let result = convert(0.0, "USD", "EUR", &rates, fixed_now()).unwrap();
        assert_eq!(result.amount, 0.0);
    }

    #[test]
    fn test_response_has_exactly_one_branch() {
        let ok: ToolResponse =
            convert(100.0, "USD", "EUR", &snapshot(&[("EUR", 0.92)]), fixed_now()).into();
        let value: Value = serde_json::from_str(&ok.to_json()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("data"));
        assert_eq!(value["data"]["equivalentString"], "100 USD = 92 EUR");
        assert!(value["data"]["lastUpdated"].is_null());

        let err: ToolResponse = ConversionError::UnsupportedCurrency("XXX".into()).into();
        let value: Value = serde_json::from_str(&err.to_json()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(value["error"]["message"], "Conversion to XXX is not supported");
        assert!(value["error"]["details"].is_null());

        let parsed: ToolResponse = serde_json::from_str(&err.to_json()).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_response_with_both_branches_is_rejected() {
        let both = r#"{"data": {}, "error": {"message": "x", "details": null}}"#;
        assert!(serde_json::from_str::<ToolResponse>(both).is_err());
        assert!(serde_json::from_str::<ToolResponse>("{}").is_err());
    }

    #[test]
    fn test_fallback_json_is_an_error_response() {
        let parsed: ToolResponse = serde_json::from_str(FALLBACK_RESPONSE_JSON).unwrap();
        assert!(parsed.is_error());
    }
}
