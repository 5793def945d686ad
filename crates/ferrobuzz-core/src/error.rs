use thiserror::Error;

use crate::price_source::SourceError;
use crate::{MovementLabel, Symbol, TradeDate};

/// Validation and contract errors exposed by `ferrobuzz-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("unix timestamp {value} is out of range")]
    InvalidTimestamp { value: i64 },
    #[error("date {date} appears more than once")]
    DuplicateDate { date: TradeDate },
    #[error("mention count for {symbol} on {date} overflows")]
    CountOverflow { symbol: Symbol, date: TradeDate },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("close on {date} must be greater than zero, got {value}")]
    NonPositiveClose { date: TradeDate, value: f64 },

    #[error("fold count must be at least 2, got {value}")]
    InvalidFoldCount { value: usize },
    #[error("neighbor count must be at least 1")]
    InvalidNeighborCount,
    #[error("no-change epsilon must be finite and non-negative, got {value}")]
    InvalidEpsilon { value: f64 },
    #[error("features ({features}) and labels ({labels}) must have the same length")]
    LengthMismatch { features: usize, labels: usize },
    #[error("classifier needs at least one training record")]
    EmptyTrainingSet,
    #[error("{records} record(s) cannot be split into {folds} folds")]
    NotEnoughRecords { records: usize, folds: usize },
}

/// Z-scores are undefined for these series.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateSeriesError {
    #[error("series has {points} point(s); at least 2 are required")]
    TooFewPoints { points: usize },
    #[error("series of {points} points has zero variance")]
    ZeroVariance { points: usize },
}

/// Fatal pipeline failures. Every variant aborts the run for the affected symbol.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing data: {context}")]
    MissingData { context: String },

    #[error("mention series for {symbol} is degenerate: {source}")]
    DegenerateSeries {
        symbol: Symbol,
        #[source]
        source: DegenerateSeriesError,
    },

    #[error("mention and price dates for {symbol} do not line up: {detail}")]
    AlignmentMismatch { symbol: Symbol, detail: String },

    #[error("{symbol} has {records} aligned record(s), fewer than {folds} folds")]
    TooFewRecords {
        symbol: Symbol,
        records: usize,
        folds: usize,
    },

    #[error("price source failed for {symbol}: {source}")]
    Source {
        symbol: Symbol,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn missing(context: impl Into<String>) -> Self {
        Self::MissingData {
            context: context.into(),
        }
    }
}

/// Non-fatal: a fold trained without any example of a class it is asked to predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ClassImbalanceWarning {
    pub fold: usize,
    pub label: MovementLabel,
}

impl std::fmt::Display for ClassImbalanceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fold {} has test records labeled {} but none in its training partition",
            self.fold, self.label
        )
    }
}
