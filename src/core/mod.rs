//! Core business logic abstractions

pub mod config;
pub mod conversion;
pub mod error;
pub mod log;
pub mod progress;
pub mod rates;

// Re-export main types for cleaner imports
pub use conversion::{ConversionRequest, ConversionResult, ErrorBody, ToolResponse};
pub use error::ConversionError;
pub use progress::{Notification, ProgressCallback};
pub use rates::{ExchangeRateProvider, ExchangeRateSnapshot};
