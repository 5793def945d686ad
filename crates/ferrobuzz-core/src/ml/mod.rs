//! Classifier, cross-validation harness and evaluation metrics.

pub mod cross_validation;
pub mod knn;
pub mod metrics;

pub use cross_validation::{
    cross_validate, CrossValidation, CrossValidationConfig, Fold, FoldSummary, StratifiedKFold,
};
pub use knn::KnnClassifier;
pub use metrics::ConfusionMatrix;
