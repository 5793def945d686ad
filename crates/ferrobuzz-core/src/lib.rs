//! # Ferrobuzz Core
//!
//! Correlates how often ticker symbols are mentioned on a stock forum with
//! the day-over-day movement of their closing price.
//!
//! ## Overview
//!
//! - **Mention counting** over forum posts and comments, per symbol and UTC day
//! - **Z-score normalization** of each symbol's daily mention counts
//! - **Price sources** for end-of-day closes (Alpha Vantage or offline CSV)
//! - **Movement labels** (`fall`, `noChange`, `rise`) from consecutive closes
//! - **Alignment and join** of both date-keyed series
//! - **Stratified k-fold KNN** producing a confusion matrix and a z-score
//!   distribution per movement category
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Price source implementations (Alpha Vantage, CSV) |
//! | [`align`] | Date intersection of two series |
//! | [`config`] | Layered run configuration |
//! | [`counter`] | Forum mention counting |
//! | [`domain`] | Symbols, dates, series and records |
//! | [`error`] | Error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`join`] | Z-score / label join |
//! | [`labeler`] | Price movement labels |
//! | [`mentions`] | Mention table |
//! | [`ml`] | KNN, stratified k-fold and confusion matrix |
//! | [`normalize`] | Z-scores |
//! | [`pipeline`] | Per-symbol analysis |
//! | [`price_source`] | Price source trait and types |
//! | [`report`] | Reports and renderers |
//! | [`throttling`] | Client-side request quota |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ferrobuzz_core::{
//!     AnalysisConfig, CsvPriceSource, MentionTable, Pipeline, Renderer, Symbol, TextRenderer,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mentions = MentionTable::load("mentions.csv")?;
//! let pipeline = Pipeline::new(
//!     Arc::new(CsvPriceSource::directory("prices")),
//!     AnalysisConfig::default(),
//! )?;
//!
//! let report = pipeline.run_symbol(&mentions, &Symbol::parse("GME")?).await?;
//! TextRenderer.render(&report, &mut std::io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fatal condition is a [`PipelineError`] carrying the symbol or input it
//! concerns. Price source failures keep their [`SourceErrorKind`]:
//!
//! ```rust
//! use ferrobuzz_core::{PipelineError, SourceErrorKind};
//!
//! fn describe(error: &PipelineError) -> &'static str {
//!     match error {
//!         PipelineError::Source { source, .. } if source.kind() == SourceErrorKind::RateLimited => {
//!             "price quota exhausted"
//!         }
//!         PipelineError::TooFewRecords { .. } => "not enough overlapping days",
//!         _ => "analysis failed",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The Alpha Vantage key comes from configuration or the environment, never code
//! - Keys are redacted from `Debug` output, logs and transport errors

pub mod adapters;
pub mod align;
pub mod config;
pub mod counter;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod join;
pub mod labeler;
pub mod mentions;
pub mod ml;
pub mod normalize;
pub mod pipeline;
pub mod price_source;
pub mod report;
pub mod throttling;

// Price sources
pub use adapters::{AlphaVantageAdapter, CsvPriceSource};
pub use price_source::{
    DailyClosesRequest, OutputSize, PriceHistory, PriceSource, SourceError, SourceErrorKind,
};

// Configuration
pub use config::{AlphaVantageConfig, AnalysisConfig, ConfigError, API_KEY_ENV};

// Domain models
pub use domain::{AlignedRecord, DailyClose, DateSeries, MovementLabel, PriceBar, Symbol, TradeDate};

// Error types
pub use error::{ClassImbalanceWarning, DegenerateSeriesError, PipelineError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Pipeline stages
pub use align::{align, Aligned};
pub use counter::{CountSummary, MentionCount, MentionCounter};
pub use join::{join, JoinMismatch};
pub use labeler::MovementLabeler;
pub use mentions::MentionTable;
pub use normalize::zscores;
pub use pipeline::{mention_zscores, Pipeline};

// Evaluation and reporting
pub use ml::{cross_validate, ConfusionMatrix, CrossValidation, CrossValidationConfig, KnnClassifier};
pub use report::{CategoryDistribution, CategoryStats, JsonRenderer, Renderer, SymbolReport, TextRenderer};

// Throttling
pub use throttling::QuotaGuard;
