//! K-nearest-neighbors classifier over the single z-score feature.

use std::collections::BTreeSet;

use crate::{MovementLabel, ValidationError};

/// Majority-vote KNN classifier.
///
/// Distance is Euclidean, which on one feature is the absolute difference.
/// Neighbors at equal distance are ordered by their position in the training
/// data, and a tied vote goes to the label of the closest tied neighbor, so
/// predictions are fully deterministic.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    features: Vec<f64>,
    labels: Vec<MovementLabel>,
}

impl KnnClassifier {
    pub fn fit(
        k: usize,
        features: &[f64],
        labels: &[MovementLabel],
    ) -> Result<Self, ValidationError> {
        if k == 0 {
            return Err(ValidationError::InvalidNeighborCount);
        }
        if features.len() != labels.len() {
            return Err(ValidationError::LengthMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }
        if features.is_empty() {
            return Err(ValidationError::EmptyTrainingSet);
        }
        if features.iter().any(|value| !value.is_finite()) {
            return Err(ValidationError::NonFiniteValue { field: "zscore" });
        }

        Ok(Self {
            k,
            features: features.to_vec(),
            labels: labels.to_vec(),
        })
    }

    /// Neighbor count actually used: `k` capped by the training size.
    pub fn effective_k(&self) -> usize {
        self.k.min(self.features.len())
    }

    pub fn classes(&self) -> BTreeSet<MovementLabel> {
        self.labels.iter().copied().collect()
    }

    /// The nearest training points as `(training index, distance)`, closest first.
    pub fn neighbors(&self, x: f64) -> Vec<(usize, f64)> {
        let mut distances = self
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| (index, (feature - x).abs()))
            .collect::<Vec<_>>();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(self.effective_k());
        distances
    }

    pub fn predict_one(&self, x: f64) -> MovementLabel {
        let neighbors = self.neighbors(x);

        let mut votes = [0_usize; MovementLabel::ALL.len()];
        for (index, _) in &neighbors {
            votes[vote_slot(self.labels[*index])] += 1;
        }
        let best = votes.iter().copied().max().unwrap_or(0);

        // fit() guarantees at least one neighbor
        neighbors
            .iter()
            .map(|(index, _)| self.labels[*index])
            .find(|label| votes[vote_slot(*label)] == best)
            .unwrap_or(self.labels[0])
    }

    pub fn predict(&self, xs: &[f64]) -> Vec<MovementLabel> {
        xs.iter().map(|x| self.predict_one(*x)).collect()
    }
}

fn vote_slot(label: MovementLabel) -> usize {
    match label {
        MovementLabel::Fall => 0,
        MovementLabel::NoChange => 1,
        MovementLabel::Rise => 2,
    }
}
