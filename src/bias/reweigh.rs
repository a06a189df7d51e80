//! Reweighing mitigation
//!
//! Adds a `sample_weight` column so that, once weighted, the sensitive
//! attribute and the target are statistically independent:
//!
//! `w(a, y) = P(A = a) * P(Y = y) / P(A = a, Y = y)`
//!
//! Without a target, rows are weighted by inverse group frequency. Weights
//! are always divided by their mean so the average weight is 1.0.

use std::collections::HashMap;
use std::hash::Hash;

use polars::prelude::*;
use tracing::debug;

use super::config::BiasConfig;
use super::error::Result;
use super::values::{column_labels, Label};

/// Name of the column added by [`reweigh`]
pub const WEIGHT_COLUMN: &str = "sample_weight";

fn frequencies<K: Eq + Hash + Clone>(keys: &[K]) -> HashMap<K, usize> {
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key.clone()).or_insert(0usize) += 1;
    }
    counts
}

/// Divide by the mean so the weights average to 1.0; a zero mean is left as is
fn normalize_to_unit_mean(weights: &mut [f64]) {
    if weights.is_empty() {
        return;
    }
    let mean = weights.iter().sum::<f64>() / weights.len() as f64;
    if mean > 0.0 {
        for w in weights.iter_mut() {
            *w /= mean;
        }
    }
}

/// Compute reweighing weights from sensitive and (optional) target values.
///
/// Missing values are treated as a category of their own.
pub fn reweighing_weights(
    sensitive: &[Option<Label>],
    target: Option<&[Option<Label>]>,
) -> Vec<f64> {
    let n = sensitive.len();
    if n == 0 {
        return Vec::new();
    }
    let total = n as f64;
    let group_counts = frequencies(sensitive);

    let mut weights: Vec<f64> = match target {
        Some(target) => {
            let target_counts = frequencies(target);
            let joint: Vec<(Option<Label>, Option<Label>)> = sensitive
                .iter()
                .cloned()
                .zip(target.iter().cloned())
                .collect();
            let joint_counts = frequencies(&joint);

            joint
                .iter()
                .map(|pair| {
                    let p_a = group_counts.get(&pair.0).copied().unwrap_or(0) as f64 / total;
                    let p_y = target_counts.get(&pair.1).copied().unwrap_or(0) as f64 / total;
                    let p_ay = joint_counts.get(pair).copied().unwrap_or(0) as f64 / total;
                    if p_ay > 0.0 {
                        p_a * p_y / p_ay
                    } else {
                        1.0
                    }
                })
                .collect()
        }
        None => {
            let max_count = group_counts.values().copied().max().unwrap_or(0) as f64;
            sensitive
                .iter()
                .map(|key| {
                    let count = group_counts.get(key).copied().unwrap_or(0);
                    if count > 0 {
                        max_count / count as f64
                    } else {
                        1.0
                    }
                })
                .collect()
        }
    };

    normalize_to_unit_mean(&mut weights);
    weights
}

/// Return a copy of `df` with a `sample_weight` column.
///
/// All original columns and the row order are preserved. The positive label
/// plays no part: weights depend on the raw target values.
///
/// # Errors
/// `ColumnNotFound` when the sensitive or target column is absent.
pub fn reweigh(df: &DataFrame, config: &BiasConfig) -> Result<DataFrame> {
    let sensitive = column_labels(df, &config.sensitive)?;
    let target = match &config.target {
        Some(name) => Some(column_labels(df, name)?),
        None => None,
    };

    let weights = reweighing_weights(&sensitive, target.as_deref());
    debug!(
        rows = weights.len(),
        with_target = target.is_some(),
        "computed reweighing weights"
    );

    let mut out = df.clone();
    out.with_column(Series::new(WEIGHT_COLUMN.into(), weights))?;
    Ok(out)
}
