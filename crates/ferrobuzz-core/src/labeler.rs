//! Day-over-day price movement labels.

use crate::{DailyClose, DateSeries, MovementLabel, PriceBar, ValidationError};

/// Percent changes within this distance of zero count as `noChange`.
pub const DEFAULT_NO_CHANGE_EPSILON: f64 = 1e-9;

/// Classifies a percent change against a symmetric `noChange` band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementLabeler {
    epsilon: f64,
}

impl Default for MovementLabeler {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_NO_CHANGE_EPSILON,
        }
    }
}

impl MovementLabeler {
    pub fn new(epsilon: f64) -> Result<Self, ValidationError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ValidationError::InvalidEpsilon { value: epsilon });
        }
        Ok(Self { epsilon })
    }

    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn classify(&self, pct_change: f64) -> MovementLabel {
        if pct_change > self.epsilon {
            MovementLabel::Rise
        } else if pct_change < -self.epsilon {
            MovementLabel::Fall
        } else {
            MovementLabel::NoChange
        }
    }

    /// Sort closes by date and label each day against the previous one.
    ///
    /// The first bar keeps `pct_change` and `label` unset.
    pub fn label(&self, closes: &[DailyClose]) -> Result<Vec<PriceBar>, ValidationError> {
        let mut closes = closes.to_vec();
        closes.sort_by_key(|close| close.date);

        let mut bars = Vec::with_capacity(closes.len());
        let mut previous: Option<DailyClose> = None;
        for current in closes {
            if !current.close.is_finite() {
                return Err(ValidationError::NonFiniteValue { field: "close" });
            }
            if current.close <= 0.0 {
                return Err(ValidationError::NonPositiveClose {
                    date: current.date,
                    value: current.close,
                });
            }

            let (pct_change, label) = match previous {
                Some(prev) if prev.date == current.date => {
                    return Err(ValidationError::DuplicateDate { date: current.date });
                }
                Some(prev) => {
                    let pct = (current.close - prev.close) / prev.close;
                    (Some(pct), Some(self.classify(pct)))
                }
                None => (None, None),
            };

            bars.push(PriceBar {
                date: current.date,
                close: current.close,
                pct_change,
                label,
            });
            previous = Some(current);
        }

        Ok(bars)
    }

    /// Labels keyed by date with the undefined first day dropped.
    pub fn labeled_days(
        &self,
        closes: &[DailyClose],
    ) -> Result<DateSeries<MovementLabel>, ValidationError> {
        Ok(self
            .label(closes)?
            .into_iter()
            .filter_map(|bar| bar.label.map(|label| (bar.date, label)))
            .collect())
    }
}
