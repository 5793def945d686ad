//! Price source trait and request/response types.
//!
//! A price source answers one question: given a ticker, what were its
//! end-of-day closes? Implementations live in [`crate::adapters`].
//!
//! | Source | Type | Description |
//! |--------|------|-------------|
//! | `alphavantage` | [`crate::AlphaVantageAdapter`] | `TIME_SERIES_DAILY` over HTTP |
//! | `csv` | [`crate::CsvPriceSource`] | Offline `date,close` files |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DailyClose, Symbol, TradeDate};

/// How much history to request from sources that paginate by size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSize {
    /// Latest 100 trading days.
    #[default]
    Compact,
    /// Full available history. Alpha Vantage serves it to premium keys only.
    Full,
}

impl OutputSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyClosesRequest {
    pub symbol: Symbol,
    pub output_size: OutputSize,
}

impl DailyClosesRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            output_size: OutputSize::default(),
        }
    }

    pub fn with_output_size(mut self, output_size: OutputSize) -> Self {
        self.output_size = output_size;
        self
    }
}

/// Closes for one symbol, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    pub symbol: Symbol,
    pub closes: Vec<DailyClose>,
}

impl PriceHistory {
    /// Sorts `closes` ascending; the order sources return them in is not trusted.
    pub fn new(symbol: Symbol, mut closes: Vec<DailyClose>) -> Self {
        closes.sort_by_key(|close| close.date);
        Self { symbol, closes }
    }

    pub fn first_date(&self) -> Option<TradeDate> {
        self.closes.first().map(|close| close.date)
    }

    pub fn last_date(&self) -> Option<TradeDate> {
        self.closes.last().map(|close| close.date)
    }
}

/// Price source error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    MissingData,
    Internal,
}

impl SourceErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::RateLimited => "rate_limited",
            Self::InvalidRequest => "invalid_request",
            Self::MissingData => "missing_data",
            Self::Internal => "internal",
        }
    }
}

/// Structured price source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::MissingData, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for SourceError {}

/// End-of-day price provider contract.
pub trait PriceSource: Send + Sync {
    /// Short identifier used in logs and reports.
    fn id(&self) -> &'static str;

    fn daily_closes<'a>(
        &'a self,
        req: DailyClosesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>>;
}
