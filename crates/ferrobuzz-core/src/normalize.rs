//! Per-symbol standardization of mention counts.

use crate::{DateSeries, DegenerateSeriesError};

/// Replace each count with `(count - mean) / population_std` over the whole series.
pub fn zscores(counts: &DateSeries<u64>) -> Result<DateSeries<f64>, DegenerateSeriesError> {
    let values = counts.values().map(|count| *count as f64).collect::<Vec<_>>();
    let (mean, std) = mean_and_population_std(&values)?;
    Ok(counts.map(|count| (*count as f64 - mean) / std))
}

/// Same as [`zscores`] for a plain slice, preserving order and length.
pub fn zscore_values(values: &[f64]) -> Result<Vec<f64>, DegenerateSeriesError> {
    let (mean, std) = mean_and_population_std(values)?;
    Ok(values.iter().map(|value| (value - mean) / std).collect())
}

fn mean_and_population_std(values: &[f64]) -> Result<(f64, f64), DegenerateSeriesError> {
    let points = values.len();
    if points < 2 {
        return Err(DegenerateSeriesError::TooFewPoints { points });
    }

    let n = points as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / n;

    // Rounding in the mean leaves a residue on flat float series; it stays
    // below one ulp of the largest magnitude.
    let std = variance.sqrt();
    let scale = values.iter().fold(0.0_f64, |acc, value| acc.max(value.abs()));
    if std <= f64::EPSILON * scale {
        return Err(DegenerateSeriesError::ZeroVariance { points });
    }

    Ok((mean, std))
}
