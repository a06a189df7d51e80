//! Mitigation dispatch
//!
//! Runs one strategy over a dataset and reports what changed.

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use super::adjust::{adjust, AdjustSummary};
use super::config::{BiasConfig, Strategy};
use super::error::Result;
use super::resample::resample;
use super::reweigh::reweigh;

/// What a mitigation run did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MitigationStats {
    pub method: String,
    pub original_rows: usize,
    pub mitigated_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjust: Option<AdjustSummary>,
}

/// Mitigated dataset and run statistics
#[derive(Debug, Clone)]
pub struct Mitigated {
    pub data: DataFrame,
    pub stats: MitigationStats,
}

/// Apply `strategy` to `df`, returning a new dataset.
///
/// The input frame is never modified.
pub fn mitigate(df: &DataFrame, config: &BiasConfig, strategy: &Strategy) -> Result<Mitigated> {
    let (data, adjust_summary) = match strategy {
        Strategy::Reweigh => (reweigh(df, config)?, None),
        Strategy::Resample { seed } => (resample(df, config, *seed)?, None),
        Strategy::Adjust(options) => {
            let adjusted = adjust(df, config, options)?;
            (adjusted.data, Some(adjusted.summary))
        }
    };

    let stats = MitigationStats {
        method: strategy.name().to_string(),
        original_rows: df.height(),
        mitigated_rows: data.height(),
        adjust: adjust_summary,
    };
    info!(
        method = %stats.method,
        original_rows = stats.original_rows,
        mitigated_rows = stats.mitigated_rows,
        "mitigation complete"
    );

    Ok(Mitigated { data, stats })
}
