//! Stratified k-fold cross-validation of the KNN classifier.
//!
//! Records are grouped by label, shuffled within each class with a seeded
//! RNG and dealt round-robin into folds. The deal counter carries over from
//! one class to the next, so fold sizes never differ by more than one and
//! each class is spread as evenly as its size allows.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::knn::KnnClassifier;
use super::metrics::ConfusionMatrix;
use crate::{AlignedRecord, ClassImbalanceWarning, MovementLabel, ValidationError};

pub const DEFAULT_FOLDS: usize = 10;
pub const DEFAULT_NEIGHBORS: usize = 5;
pub const DEFAULT_SEED: u64 = 42;

/// One train/test partition, both index lists ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub index: usize,
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded stratified k-fold splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    folds: usize,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(folds: usize, seed: u64) -> Result<Self, ValidationError> {
        if folds < 2 {
            return Err(ValidationError::InvalidFoldCount { value: folds });
        }
        Ok(Self { folds, seed })
    }

    pub const fn folds(&self) -> usize {
        self.folds
    }

    pub fn split(&self, labels: &[MovementLabel]) -> Result<Vec<Fold>, ValidationError> {
        if labels.len() < self.folds {
            return Err(ValidationError::NotEnoughRecords {
                records: labels.len(),
                folds: self.folds,
            });
        }

        let mut rng = fastrand::Rng::with_seed(self.seed);
        let mut assignment = vec![0_usize; labels.len()];
        let mut deal = 0_usize;

        for class in MovementLabel::ALL {
            let mut members = labels
                .iter()
                .enumerate()
                .filter(|(_, label)| **label == class)
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            rng.shuffle(&mut members);

            for index in members {
                assignment[index] = deal % self.folds;
                deal += 1;
            }
        }

        Ok((0..self.folds)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|index| assignment[*index] == fold);
                Fold {
                    index: fold,
                    train,
                    test,
                }
            })
            .collect())
    }
}

/// Harness parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossValidationConfig {
    pub folds: usize,
    pub neighbors: usize,
    pub seed: u64,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self {
            folds: DEFAULT_FOLDS,
            neighbors: DEFAULT_NEIGHBORS,
            seed: DEFAULT_SEED,
        }
    }
}

impl CrossValidationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.folds < 2 {
            return Err(ValidationError::InvalidFoldCount { value: self.folds });
        }
        if self.neighbors == 0 {
            return Err(ValidationError::InvalidNeighborCount);
        }
        Ok(())
    }
}

/// Per-fold bookkeeping kept in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoldSummary {
    pub index: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub correct: usize,
}

/// Out-of-fold predictions for every record plus their confusion matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidation {
    /// Predicted label per record, in record order.
    pub predictions: Vec<MovementLabel>,
    pub confusion: ConfusionMatrix,
    pub folds: Vec<FoldSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ClassImbalanceWarning>,
}

impl CrossValidation {
    pub fn accuracy(&self) -> Option<f64> {
        self.confusion.accuracy()
    }
}

/// Train one KNN model per fold and predict its held-out records.
///
/// A fold whose training partition lacks a class that appears in its test
/// partition cannot predict that class; this is reported as a
/// [`ClassImbalanceWarning`] and evaluation continues.
pub fn cross_validate(
    records: &[AlignedRecord],
    config: &CrossValidationConfig,
) -> Result<CrossValidation, ValidationError> {
    config.validate()?;

    let features = records.iter().map(|record| record.zscore).collect::<Vec<_>>();
    let labels = records.iter().map(|record| record.label).collect::<Vec<_>>();
    let splitter = StratifiedKFold::new(config.folds, config.seed)?;

    let mut predictions: Vec<Option<MovementLabel>> = vec![None; records.len()];
    let mut summaries = Vec::with_capacity(config.folds);
    let mut warnings = Vec::new();

    for fold in splitter.split(&labels)? {
        let train_x = fold.train.iter().map(|i| features[*i]).collect::<Vec<_>>();
        let train_y = fold.train.iter().map(|i| labels[*i]).collect::<Vec<_>>();
        let model = KnnClassifier::fit(config.neighbors, &train_x, &train_y)?;

        let trained = model.classes();
        let tested = fold.test.iter().map(|i| labels[*i]).collect::<BTreeSet<_>>();
        for label in tested.difference(&trained) {
            let warning = ClassImbalanceWarning {
                fold: fold.index,
                label: *label,
            };
            warn!(%warning, "class missing from training partition");
            warnings.push(warning);
        }

        let mut correct = 0;
        for index in &fold.test {
            let guess = model.predict_one(features[*index]);
            if guess == labels[*index] {
                correct += 1;
            }
            predictions[*index] = Some(guess);
        }

        debug!(
            fold = fold.index,
            train = fold.train.len(),
            test = fold.test.len(),
            correct,
            "evaluated fold"
        );
        summaries.push(FoldSummary {
            index: fold.index,
            train_size: fold.train.len(),
            test_size: fold.test.len(),
            correct,
        });
    }

    // Every record lands in exactly one test partition.
    let predictions = predictions.into_iter().flatten().collect::<Vec<_>>();
    let confusion = ConfusionMatrix::from_predictions(&labels, &predictions)?;

    Ok(CrossValidation {
        predictions,
        confusion,
        folds: summaries,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TradeDate;
    use MovementLabel::{Fall, NoChange, Rise};

    fn records(points: &[(f64, MovementLabel)]) -> Vec<AlignedRecord> {
        let start = TradeDate::parse("2021-01-04").expect("valid").into_inner();
        points
            .iter()
            .enumerate()
            .map(|(offset, (zscore, label))| AlignedRecord {
                date: TradeDate::from(start + time::Duration::days(offset as i64)),
                zscore: *zscore,
                label: *label,
            })
            .collect()
    }

    #[test]
    fn every_index_is_tested_exactly_once() {
        let labels = [Rise, Fall, Rise, Rise, Fall, NoChange, Rise, Fall, Fall, Rise, Rise];
        let folds = StratifiedKFold::new(3, 7).expect("valid").split(&labels).expect("enough");

        let mut seen = folds.iter().flat_map(|f| f.test.clone()).collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, (0..labels.len()).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), labels.len());
            assert!(fold.test.iter().all(|i| !fold.train.contains(i)));
        }
    }

    #[test]
    fn folds_are_balanced_and_stratified() {
        let mut labels = vec![Rise; 12];
        labels.extend(vec![Fall; 8]);
        let folds = StratifiedKFold::new(4, 1).expect("valid").split(&labels).expect("enough");

        for fold in &folds {
            assert_eq!(fold.test.len(), 5);
            let rises = fold.test.iter().filter(|i| labels[**i] == Rise).count();
            assert_eq!(rises, 3);
        }
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let labels = [Rise, Fall, Rise, Fall, Rise, Fall, NoChange, Rise];
        let first = StratifiedKFold::new(2, 99).expect("valid").split(&labels);
        let second = StratifiedKFold::new(2, 99).expect("valid").split(&labels);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_more_folds_than_records() {
        let err = StratifiedKFold::new(5, 0)
            .expect("valid")
            .split(&[Rise, Fall])
            .expect_err("must fail");
        assert_eq!(err, ValidationError::NotEnoughRecords { records: 2, folds: 5 });
        assert!(StratifiedKFold::new(1, 0).is_err());
    }

    #[test]
    fn separable_data_is_classified_perfectly() {
        let mut points = Vec::new();
        for i in 0..10 {
            points.push((-3.0 - i as f64 * 0.1, Fall));
            points.push((3.0 + i as f64 * 0.1, Rise));
        }
        let config = CrossValidationConfig {
            folds: 5,
            neighbors: 3,
            seed: 42,
        };

        let result = cross_validate(&records(&points), &config).expect("valid");
        assert_eq!(result.predictions.len(), points.len());
        assert_eq!(result.confusion.total(), points.len() as u64);
        assert_eq!(result.accuracy(), Some(1.0));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn singleton_class_produces_warning_not_error() {
        let mut points = vec![(0.0, NoChange)];
        for i in 0..9 {
            points.push((i as f64, if i % 2 == 0 { Rise } else { Fall }));
        }
        let config = CrossValidationConfig {
            folds: 3,
            neighbors: 3,
            seed: 5,
        };

        let result = cross_validate(&records(&points), &config).expect("must not fail");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].label, NoChange);
        assert_eq!(result.confusion.row_sum(NoChange), 1);
        assert_eq!(result.confusion.get(NoChange, NoChange), 0);
    }
}
