//! Confusion matrix over movement labels.

use serde::Serialize;

use crate::{MovementLabel, ValidationError};

/// Square grid of `(true label, predicted label)` counts.
///
/// Rows are true labels, columns are predictions, both in the canonical
/// label order and restricted to labels seen among either the truths or
/// the predictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    labels: Vec<MovementLabel>,
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    pub fn from_predictions(
        truth: &[MovementLabel],
        predicted: &[MovementLabel],
    ) -> Result<Self, ValidationError> {
        if truth.len() != predicted.len() {
            return Err(ValidationError::LengthMismatch {
                features: predicted.len(),
                labels: truth.len(),
            });
        }

        let labels = MovementLabel::ALL
            .into_iter()
            .filter(|label| truth.contains(label) || predicted.contains(label))
            .collect::<Vec<_>>();
        let mut counts = vec![vec![0_u64; labels.len()]; labels.len()];

        for (actual, guess) in truth.iter().zip(predicted) {
            let row = position(&labels, *actual);
            let column = position(&labels, *guess);
            if let (Some(row), Some(column)) = (row, column) {
                counts[row][column] += 1;
            }
        }

        Ok(Self { labels, counts })
    }

    pub fn labels(&self) -> &[MovementLabel] {
        &self.labels
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn dimension(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, actual: MovementLabel, predicted: MovementLabel) -> u64 {
        match (position(&self.labels, actual), position(&self.labels, predicted)) {
            (Some(row), Some(column)) => self.counts[row][column],
            _ => 0,
        }
    }

    /// Number of records whose true label is `actual`.
    pub fn row_sum(&self, actual: MovementLabel) -> u64 {
        position(&self.labels, actual)
            .map(|row| self.counts[row].iter().sum())
            .unwrap_or(0)
    }

    /// Number of records predicted as `predicted`.
    pub fn column_sum(&self, predicted: MovementLabel) -> u64 {
        position(&self.labels, predicted)
            .map(|column| self.counts.iter().map(|row| row[column]).sum())
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> u64 {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Fraction of records on the diagonal, `None` for an empty matrix.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct() as f64 / total as f64)
    }

    pub fn max_cell(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

fn position(labels: &[MovementLabel], label: MovementLabel) -> Option<usize> {
    labels.iter().position(|candidate| *candidate == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use MovementLabel::{Fall, NoChange, Rise};

    #[test]
    fn row_and_column_sums_match_label_counts() {
        let truth = [Rise, Rise, Fall, Fall, Fall, NoChange];
        let predicted = [Rise, Fall, Fall, Rise, Fall, Rise];
        let matrix = ConfusionMatrix::from_predictions(&truth, &predicted).expect("same length");

        for label in MovementLabel::ALL {
            let true_count = truth.iter().filter(|l| **l == label).count() as u64;
            let predicted_count = predicted.iter().filter(|l| **l == label).count() as u64;
            assert_eq!(matrix.row_sum(label), true_count);
            assert_eq!(matrix.column_sum(label), predicted_count);
        }
        assert_eq!(matrix.total(), truth.len() as u64);
        assert_eq!(matrix.get(Fall, Fall), 2);
        assert_eq!(matrix.get(NoChange, Rise), 1);
        assert_eq!(matrix.correct(), 3);
    }

    #[test]
    fn dimension_covers_only_observed_labels() {
        let matrix =
            ConfusionMatrix::from_predictions(&[Rise, Fall], &[Fall, Fall]).expect("same length");
        assert_eq!(matrix.labels(), &[Fall, Rise]);
        assert_eq!(matrix.rows(), &[vec![1, 0], vec![1, 0]]);
        assert_eq!(matrix.get(NoChange, NoChange), 0);
    }

    #[test]
    fn empty_matrix_has_no_accuracy() {
        let matrix = ConfusionMatrix::from_predictions(&[], &[]).expect("same length");
        assert_eq!(matrix.dimension(), 0);
        assert_eq!(matrix.accuracy(), None);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = ConfusionMatrix::from_predictions(&[Rise], &[]).expect_err("must fail");
        assert!(matches!(err, ValidationError::LengthMismatch { .. }));
    }
}
