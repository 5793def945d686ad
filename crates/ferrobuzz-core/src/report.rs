//! Per-symbol analysis report and its renderers.
//!
//! | Renderer | Output |
//! |----------|--------|
//! | [`TextRenderer`] | Shaded confusion matrix grid and a z-score distribution table |
//! | [`JsonRenderer`] | The serialized [`SymbolReport`], compact or pretty |

use std::io::{self, Write};

use serde::Serialize;

use crate::ml::{ConfusionMatrix, CrossValidation, CrossValidationConfig, FoldSummary};
use crate::{AlignedRecord, ClassImbalanceWarning, MovementLabel, Symbol, TradeDate};

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

const HEAT_GLYPHS: [char; 5] = [' ', '░', '▒', '▓', '█'];
const SPARK_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Z-score summary for the records carrying one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub label: MovementLabel,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Counts per bin over the distribution's shared `[lower, upper]` range.
    pub histogram: Vec<u64>,
}

/// Distribution of z-scores by price-movement category.
///
/// All categories share one set of equal-width bins so their histograms
/// can be compared side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDistribution {
    pub lower: f64,
    pub upper: f64,
    pub bins: usize,
    pub categories: Vec<CategoryStats>,
}

impl CategoryDistribution {
    pub fn from_records(records: &[AlignedRecord], bins: usize) -> Self {
        let bins = bins.max(1);
        let lower = records
            .iter()
            .map(|record| record.zscore)
            .fold(f64::INFINITY, f64::min);
        let upper = records
            .iter()
            .map(|record| record.zscore)
            .fold(f64::NEG_INFINITY, f64::max);

        if records.is_empty() {
            return Self {
                lower: 0.0,
                upper: 0.0,
                bins,
                categories: Vec::new(),
            };
        }

        let width = (upper - lower) / bins as f64;
        let bin_of = |value: f64| {
            if width <= 0.0 {
                return 0;
            }
            (((value - lower) / width) as usize).min(bins - 1)
        };

        let categories = MovementLabel::ALL
            .iter()
            .filter_map(|label| {
                let values = records
                    .iter()
                    .filter(|record| record.label == *label)
                    .map(|record| record.zscore)
                    .collect::<Vec<_>>();
                if values.is_empty() {
                    return None;
                }

                let mut histogram = vec![0; bins];
                for value in &values {
                    histogram[bin_of(*value)] += 1;
                }

                Some(CategoryStats {
                    label: *label,
                    count: values.len(),
                    mean: values.iter().sum::<f64>() / values.len() as f64,
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    histogram,
                })
            })
            .collect();

        Self {
            lower,
            upper,
            bins,
            categories,
        }
    }

    pub fn get(&self, label: MovementLabel) -> Option<&CategoryStats> {
        self.categories.iter().find(|stats| stats.label == label)
    }
}

/// Everything reported for one symbol after cross-validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub price_source: String,
    pub records: usize,
    pub first_date: Option<TradeDate>,
    pub last_date: Option<TradeDate>,
    pub settings: CrossValidationConfig,
    pub confusion: ConfusionMatrix,
    pub accuracy: Option<f64>,
    pub folds: Vec<FoldSummary>,
    pub distribution: CategoryDistribution,
    pub warnings: Vec<ClassImbalanceWarning>,
}

impl SymbolReport {
    pub fn new(
        symbol: Symbol,
        price_source: impl Into<String>,
        records: &[AlignedRecord],
        settings: CrossValidationConfig,
        evaluation: CrossValidation,
    ) -> Self {
        Self {
            symbol,
            price_source: price_source.into(),
            records: records.len(),
            first_date: records.first().map(|record| record.date),
            last_date: records.last().map(|record| record.date),
            settings,
            accuracy: evaluation.accuracy(),
            confusion: evaluation.confusion,
            folds: evaluation.folds,
            distribution: CategoryDistribution::from_records(records, DEFAULT_HISTOGRAM_BINS),
            warnings: evaluation.warnings,
        }
    }
}

/// Output collaborator for reports.
pub trait Renderer {
    fn render(&self, report: &SymbolReport, out: &mut dyn Write) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn heat_glyph(count: u64, max: u64) -> char {
        if count == 0 || max == 0 {
            return HEAT_GLYPHS[0];
        }
        let steps = (HEAT_GLYPHS.len() - 1) as u64;
        let level = (count * steps).div_ceil(max);
        HEAT_GLYPHS[level.min(steps) as usize]
    }

    fn sparkline(histogram: &[u64]) -> String {
        let max = histogram.iter().copied().max().unwrap_or(0);
        histogram
            .iter()
            .map(|count| {
                if *count == 0 || max == 0 {
                    return ' ';
                }
                let top = (SPARK_GLYPHS.len() - 1) as u64;
                SPARK_GLYPHS[(count * top / max) as usize]
            })
            .collect()
    }

    fn render_confusion(matrix: &ConfusionMatrix, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "confusion matrix (rows: actual, columns: predicted)")?;
        write!(out, "{:<10}", "")?;
        for label in matrix.labels() {
            write!(out, " {:>10}", label.as_str())?;
        }
        writeln!(out)?;

        let max = matrix.max_cell();
        for (actual, row) in matrix.labels().iter().zip(matrix.rows()) {
            write!(out, "{:<10}", actual.as_str())?;
            for count in row {
                write!(out, " {}{:>9}", Self::heat_glyph(*count, max), count)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn render_distribution(distribution: &CategoryDistribution, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "z-score distribution ({} bins over [{:.3}, {:.3}])",
            distribution.bins, distribution.lower, distribution.upper
        )?;
        writeln!(
            out,
            "{:<10} {:>6} {:>8} {:>8} {:>8}  histogram",
            "label", "count", "mean", "min", "max"
        )?;
        for stats in &distribution.categories {
            writeln!(
                out,
                "{:<10} {:>6} {:>8.3} {:>8.3} {:>8.3}  {}",
                stats.label.as_str(),
                stats.count,
                stats.mean,
                stats.min,
                stats.max,
                Self::sparkline(&stats.histogram)
            )?;
        }
        Ok(())
    }
}

impl Renderer for TextRenderer {
    fn render(&self, report: &SymbolReport, out: &mut dyn Write) -> io::Result<()> {
        let span = match (report.first_date, report.last_date) {
            (Some(first), Some(last)) => format!("{first}..{last}"),
            _ => String::from("-"),
        };
        let accuracy = report
            .accuracy
            .map(|value| format!("{value:.3}"))
            .unwrap_or_else(|| String::from("-"));

        writeln!(out, "symbol    : {}", report.symbol)?;
        writeln!(out, "prices    : {}", report.price_source)?;
        writeln!(out, "records   : {} ({span})", report.records)?;
        writeln!(
            out,
            "folds     : {} (neighbors={}, seed={})",
            report.settings.folds, report.settings.neighbors, report.settings.seed
        )?;
        writeln!(out, "accuracy  : {accuracy}")?;
        writeln!(out)?;

        Self::render_confusion(&report.confusion, out)?;
        writeln!(out)?;
        Self::render_distribution(&report.distribution, out)?;

        if !report.warnings.is_empty() {
            writeln!(out)?;
            writeln!(out, "warnings:")?;
            for warning in &report.warnings {
                writeln!(out, "  - {warning}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Renderer for JsonRenderer {
    fn render(&self, report: &SymbolReport, out: &mut dyn Write) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, report)?;
        } else {
            serde_json::to_writer(&mut *out, report)?;
        }
        writeln!(out)
    }
}
