//! Resampling mitigation
//!
//! Upsamples every stratum to the size of the largest one by drawing rows
//! with replacement. Strata are keyed by `(sensitive, target)` when a target
//! is configured, otherwise by the sensitive value alone. Rows are never
//! dropped, so every original row appears in the output at least once.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::config::BiasConfig;
use super::error::Result;
use super::values::{column_labels, partition, Label};

/// Row indices of the resampled dataset.
///
/// Strata appear in first-appearance order; within a stratum the original
/// rows come first, followed by the drawn duplicates.
pub fn resample_indices(strata_keys: &[(Option<Label>, Option<Label>)], seed: u64) -> Vec<usize> {
    let strata = partition(strata_keys);
    let max_size = strata.iter().map(|(_, rows)| rows.len()).max().unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut indices = Vec::with_capacity(max_size * strata.len());
    for (_, rows) in &strata {
        indices.extend_from_slice(rows);
        if rows.is_empty() || rows.len() >= max_size {
            continue;
        }
        for _ in 0..(max_size - rows.len()) {
            indices.push(rows[rng.gen_range(0..rows.len())]);
        }
    }

    debug!(
        strata = strata.len(),
        stratum_size = max_size,
        rows = indices.len(),
        "resampled strata"
    );
    indices
}

/// Return an upsampled copy of `df` with balanced strata.
///
/// Draws come from a `StdRng` seeded with `seed`, so repeated calls with the
/// same input produce the same dataset.
///
/// # Errors
/// `ColumnNotFound` when the sensitive or target column is absent, also for
/// an empty frame.
pub fn resample(df: &DataFrame, config: &BiasConfig, seed: u64) -> Result<DataFrame> {
    let sensitive = column_labels(df, &config.sensitive)?;
    let keys: Vec<(Option<Label>, Option<Label>)> = match &config.target {
        Some(name) => sensitive
            .into_iter()
            .zip(column_labels(df, name)?)
            .collect(),
        None => sensitive.into_iter().map(|a| (a, None)).collect(),
    };
    if keys.is_empty() {
        return Ok(df.clone());
    }

    let indices: Vec<IdxSize> = resample_indices(&keys, seed)
        .into_iter()
        .map(|i| i as IdxSize)
        .collect();
    let idx = IdxCa::from_vec("idx".into(), indices);
    Ok(df.take(&idx)?)
}
