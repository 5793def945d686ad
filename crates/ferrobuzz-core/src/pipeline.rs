//! End-to-end analysis for one or more symbols.
//!
//! ```text
//! MentionTable ──▶ zscores ──┐
//!                            ├──▶ align ──▶ join ──▶ cross_validate ──▶ SymbolReport
//! PriceSource ──▶ labeler ───┘
//! ```
//!
//! Symbols run one after another and the first fatal error ends the run.

use std::sync::Arc;

use tracing::info;

use crate::align::align;
use crate::config::AnalysisConfig;
use crate::join::join;
use crate::labeler::MovementLabeler;
use crate::ml::cross_validate;
use crate::normalize::zscores;
use crate::price_source::{DailyClosesRequest, PriceSource};
use crate::report::SymbolReport;
use crate::{
    AlignedRecord, DailyClose, DateSeries, MentionTable, MovementLabel, PipelineError, PriceBar, Symbol,
    ValidationError,
};

/// Z-scored daily mentions for `symbol`.
pub fn mention_zscores(
    mentions: &MentionTable,
    symbol: &Symbol,
    zero_fill: bool,
) -> Result<DateSeries<f64>, PipelineError> {
    let counts = mentions.series(symbol, zero_fill)?;
    zscores(&counts).map_err(|source| PipelineError::DegenerateSeries {
        symbol: symbol.clone(),
        source,
    })
}

pub struct Pipeline {
    source: Arc<dyn PriceSource>,
    config: AnalysisConfig,
    labeler: MovementLabeler,
}

impl Pipeline {
    pub fn new(source: Arc<dyn PriceSource>, config: AnalysisConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let labeler = MovementLabeler::new(config.no_change_epsilon)?;
        Ok(Self {
            source,
            config,
            labeler,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    async fn fetch_closes(&self, symbol: &Symbol) -> Result<Vec<DailyClose>, PipelineError> {
        let request = DailyClosesRequest::new(symbol.clone())
            .with_output_size(self.config.alphavantage.output_size);
        let history = self
            .source
            .daily_closes(request)
            .await
            .map_err(|source| PipelineError::Source {
                symbol: symbol.clone(),
                source,
            })?;
        Ok(history.closes)
    }

    /// Fetch closes for `symbol` and label every day after the first.
    pub async fn price_bars(&self, symbol: &Symbol) -> Result<Vec<PriceBar>, PipelineError> {
        let closes = self.fetch_closes(symbol).await?;
        Ok(self.labeler.label(&closes)?)
    }

    async fn labeled_days(&self, symbol: &Symbol) -> Result<DateSeries<MovementLabel>, PipelineError> {
        let closes = self.fetch_closes(symbol).await?;
        Ok(self.labeler.labeled_days(&closes)?)
    }

    /// Joined classifier records for `symbol`, ascending by date.
    pub async fn records(
        &self,
        mentions: &MentionTable,
        symbol: &Symbol,
    ) -> Result<Vec<AlignedRecord>, PipelineError> {
        let zscores = mention_zscores(mentions, symbol, self.config.zero_fill)?;
        info!(%symbol, days = zscores.len(), "normalized mention counts");

        let labels = self.labeled_days(symbol).await?;
        info!(%symbol, source = self.source.id(), days = labels.len(), "labeled price moves");

        let aligned = align(&zscores, &labels);
        if aligned.is_empty() {
            return Err(PipelineError::AlignmentMismatch {
                symbol: symbol.clone(),
                detail: format!(
                    "mentions cover {} while labeled prices cover {}",
                    span(&zscores),
                    span(&labels)
                ),
            });
        }

        let records = join(&aligned.left, &aligned.right).map_err(|mismatch| {
            PipelineError::AlignmentMismatch {
                symbol: symbol.clone(),
                detail: mismatch.to_string(),
            }
        })?;
        info!(%symbol, records = records.len(), "aligned mentions with prices");
        Ok(records)
    }

    pub async fn run_symbol(
        &self,
        mentions: &MentionTable,
        symbol: &Symbol,
    ) -> Result<SymbolReport, PipelineError> {
        let records = self.records(mentions, symbol).await?;
        let settings = self.config.cross_validation;

        let evaluation = cross_validate(&records, &settings).map_err(|error| match error {
            ValidationError::NotEnoughRecords { records, folds } => PipelineError::TooFewRecords {
                symbol: symbol.clone(),
                records,
                folds,
            },
            other => PipelineError::Validation(other),
        })?;

        info!(
            %symbol,
            records = records.len(),
            accuracy = evaluation.accuracy().unwrap_or(f64::NAN),
            warnings = evaluation.warnings.len(),
            "cross-validated classifier"
        );
        Ok(SymbolReport::new(
            symbol.clone(),
            self.source.id(),
            &records,
            settings,
            evaluation,
        ))
    }

    pub async fn run(
        &self,
        mentions: &MentionTable,
        symbols: &[Symbol],
    ) -> Result<Vec<SymbolReport>, PipelineError> {
        let mut reports = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            reports.push(self.run_symbol(mentions, symbol).await?);
        }
        Ok(reports)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.id())
            .field("config", &self.config)
            .finish()
    }
}

fn span<T>(series: &DateSeries<T>) -> String {
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => format!("{first}..{last}"),
        _ => String::from("no days"),
    }
}
