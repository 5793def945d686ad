use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::TradeDate;

/// Direction of a day-over-day close change.
///
/// Variant order is the row/column order used by confusion matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovementLabel {
    Fall,
    NoChange,
    Rise,
}

impl MovementLabel {
    pub const ALL: [Self; 3] = [Self::Fall, Self::NoChange, Self::Rise];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fall => "fall",
            Self::NoChange => "noChange",
            Self::Rise => "rise",
        }
    }
}

impl Display for MovementLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// End-of-day close as returned by a price source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: TradeDate,
    pub close: f64,
}

impl DailyClose {
    pub const fn new(date: TradeDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Labeled daily bar. The first bar of a series has no previous close,
/// so both `pct_change` and `label` are `None` there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: TradeDate,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<MovementLabel>,
}

/// One joined observation: the day's mention z-score and that day's price move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedRecord {
    pub date: TradeDate,
    pub zscore: f64,
    pub label: MovementLabel,
}
