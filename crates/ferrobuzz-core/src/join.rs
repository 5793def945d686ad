//! Merge aligned z-scores and movement labels into classifier records.

use crate::{AlignedRecord, DateSeries, MovementLabel, TradeDate};

/// Why two supposedly aligned series could not be zipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMismatch {
    /// The date is present in the z-score series but not in the labels.
    MissingLabel(TradeDate),
    /// The date is present in the labels but not in the z-score series.
    MissingZscore(TradeDate),
}

impl std::fmt::Display for JoinMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLabel(date) => write!(f, "{date} has a z-score but no price label"),
            Self::MissingZscore(date) => write!(f, "{date} has a price label but no z-score"),
        }
    }
}

/// Zip two series that share exactly the same dates into ascending records.
pub fn join(
    zscores: &DateSeries<f64>,
    labels: &DateSeries<MovementLabel>,
) -> Result<Vec<AlignedRecord>, JoinMismatch> {
    if let Some(date) = labels.dates().find(|date| !zscores.contains(date)) {
        return Err(JoinMismatch::MissingZscore(date));
    }

    zscores
        .iter()
        .map(|(date, zscore)| {
            let label = labels
                .get(date)
                .copied()
                .ok_or(JoinMismatch::MissingLabel(*date))?;
            Ok(AlignedRecord {
                date: *date,
                zscore: *zscore,
                label,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;

    fn day(value: &str) -> TradeDate {
        TradeDate::parse(value).expect("valid date")
    }

    #[test]
    fn joins_aligned_series_one_record_per_day() {
        let zscores: DateSeries<f64> = [
            (day("2021-01-23"), 0.3),
            (day("2021-01-25"), -1.0),
            (day("2021-01-26"), 0.7),
        ]
        .into_iter()
        .collect();
        let labels: DateSeries<MovementLabel> = [
            (day("2021-01-25"), MovementLabel::Rise),
            (day("2021-01-26"), MovementLabel::Fall),
            (day("2021-01-27"), MovementLabel::NoChange),
        ]
        .into_iter()
        .collect();

        let aligned = align(&zscores, &labels);
        let records = join(&aligned.left, &aligned.right).expect("aligned inputs");

        assert_eq!(records.len(), aligned.len());
        assert_eq!(records[0].date, day("2021-01-25"));
        assert_eq!(records[0].label, MovementLabel::Rise);
        assert_eq!(records[1].zscore, 0.7);
    }

    #[test]
    fn reports_first_unmatched_date() {
        let zscores: DateSeries<f64> = [(day("2021-01-25"), 0.1)].into_iter().collect();
        let labels: DateSeries<MovementLabel> = [
            (day("2021-01-25"), MovementLabel::Rise),
            (day("2021-01-26"), MovementLabel::Rise),
        ]
        .into_iter()
        .collect();

        let err = join(&zscores, &labels).expect_err("must fail");
        assert_eq!(err, JoinMismatch::MissingZscore(day("2021-01-26")));

        let err = join(&zscores, &DateSeries::new()).expect_err("must fail");
        assert_eq!(err, JoinMismatch::MissingLabel(day("2021-01-25")));
    }
}
