//! Bias report engine
//!
//! Computes per-group representation and outcome metrics for one sensitive
//! column, plus aggregate fairness measures:
//!
//! - **Demographic parity difference**: highest minus lowest group positive rate
//! - **Disparate impact**: lowest over highest group positive rate
//! - **Statistical parity difference**: group rate minus overall rate
//! - **Imbalance ratio** (no target): largest over smallest group share
//!
//! All floats are rounded to 6 decimals and undefined values are `None`
//! (serialized as `null`), never NaN.

use std::collections::HashSet;

use polars::prelude::*;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use super::config::BiasConfig;
use super::error::Result;
use super::label::{positive_mask, resolve_positive_label};
use super::values::{column_labels, compare_keys, partition, round6, Label, MISSING_KEY};

/// Metrics for one group of the sensitive column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetrics {
    /// Group value as displayed; missing values use `null`, or `<null>` when
    /// a present value already reads `null`
    #[serde(skip)]
    pub group: String,
    pub n: usize,
    pub share: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistical_parity_diff: Option<f64>,
}

/// Aggregate metrics when a usable target is present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeSummary {
    pub overall_positive_rate: f64,
    pub demographic_parity_diff: Option<f64>,
    pub disparate_impact: Option<f64>,
    pub max_group_positive_rate: Option<f64>,
    pub min_group_positive_rate: Option<f64>,
}

/// Aggregate section of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportSummary {
    Outcome(OutcomeSummary),
    Distribution { imbalance_ratio: Option<f64> },
}

/// Complete bias report for one column selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasReport {
    pub sensitive: String,
    pub target: Option<String>,
    /// Positive label used for the outcome metrics, explicit or inferred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_label: Option<Label>,
    pub total_rows: usize,
    /// Groups in ascending value order, missing values last
    #[serde(serialize_with = "serialize_groups")]
    pub groups: Vec<GroupMetrics>,
    pub summary: ReportSummary,
    pub warnings: Vec<String>,
}

impl BiasReport {
    /// Look up a group by its displayed value
    pub fn group(&self, name: &str) -> Option<&GroupMetrics> {
        self.groups.iter().find(|g| g.group == name)
    }

    /// Outcome metrics, if the report has them
    pub fn outcome(&self) -> Option<&OutcomeSummary> {
        match &self.summary {
            ReportSummary::Outcome(summary) => Some(summary),
            ReportSummary::Distribution { .. } => None,
        }
    }
}

/// Groups are keyed by value in the serialized report
fn serialize_groups<S: Serializer>(
    groups: &[GroupMetrics],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(groups.len()))?;
    for group in groups {
        map.serialize_entry(&group.group, group)?;
    }
    map.end()
}

/// Name of the missing-value group, `null` unless a present value already
/// displays as `null`; then it is wrapped in angle brackets until unique.
fn missing_group_name(partitions: &[(Option<Label>, Vec<usize>)]) -> String {
    let taken: HashSet<String> = partitions
        .iter()
        .filter_map(|(key, _)| key.as_ref().map(Label::to_string))
        .collect();
    let mut name = MISSING_KEY.to_string();
    while taken.contains(&name) {
        name = format!("<{}>", name);
    }
    name
}

/// Compute the bias report for `config.sensitive` (and `config.target`).
///
/// # Errors
/// `ColumnNotFound` when the sensitive column, or a named target column, is
/// absent. Degenerate data (empty frame, one group, undeterminable positive
/// label) is reported through `warnings` instead.
pub fn compute_bias_report(df: &DataFrame, config: &BiasConfig) -> Result<BiasReport> {
    let sensitive = column_labels(df, &config.sensitive)?;
    let target_values = match &config.target {
        Some(target) => Some(column_labels(df, target)?),
        None => None,
    };

    let total = df.height();
    let mut warnings = Vec::new();
    if total == 0 {
        warnings.push("Dataset is empty; shares and rates default to zero.".to_string());
    }

    let mut positive_label = None;
    let mut mask = None;
    if let (Some(target), Some(values)) = (&config.target, &target_values) {
        match resolve_positive_label(config.positive_label.as_ref(), values) {
            Some(label) => {
                mask = Some(positive_mask(values, &label));
                positive_label = Some(label);
            }
            None => {
                warn!(target = %target, "positive label undetermined, falling back to distribution analysis");
                warnings.push(format!(
                    "Could not infer positive label for '{}'; treating as no-target analysis.",
                    target
                ));
            }
        }
    }

    let mut partitions = partition(&sensitive);
    partitions.sort_by(|a, b| compare_keys(&a.0, &b.0));

    if total > 0 && partitions.len() < 2 {
        warnings.push(format!(
            "Column '{}' has fewer than two groups; comparative metrics are degenerate.",
            config.sensitive
        ));
    }

    // Raw rates feed the aggregates; rounding applies to reported values only
    let raw_rates: Vec<Option<f64>> = partitions
        .iter()
        .map(|(_, rows)| {
            mask.as_ref().map(|mask| {
                let positives = rows.iter().filter(|&&row| mask[row]).count();
                if rows.is_empty() {
                    0.0
                } else {
                    positives as f64 / rows.len() as f64
                }
            })
        })
        .collect();

    let missing_name = missing_group_name(&partitions);
    let mut groups: Vec<GroupMetrics> = partitions
        .iter()
        .zip(raw_rates.iter())
        .map(|((key, rows), rate)| {
            let n = rows.len();
            let share = if total > 0 { n as f64 / total as f64 } else { 0.0 };
            GroupMetrics {
                group: key
                    .as_ref()
                    .map_or_else(|| missing_name.clone(), Label::to_string),
                n,
                share: round6(share),
                positive_rate: rate.map(round6),
                statistical_parity_diff: None,
            }
        })
        .collect();

    let summary = match &mask {
        Some(mask) => {
            let positives = mask.iter().filter(|&&p| p).count();
            let overall = if total > 0 {
                positives as f64 / total as f64
            } else {
                0.0
            };

            for (group, rate) in groups.iter_mut().zip(raw_rates.iter()) {
                group.statistical_parity_diff = rate.map(|r| round6(r - overall));
            }

            let rates: Vec<f64> = raw_rates.iter().flatten().copied().collect();
            let max_rate = rates.iter().copied().reduce(f64::max);
            let min_rate = rates.iter().copied().reduce(f64::min);

            let (dp_diff, disparate_impact) = match (max_rate, min_rate) {
                (Some(max), Some(min)) => {
                    let impact = if max > 0.0 { Some(round6(min / max)) } else { None };
                    (Some(round6(max - min)), impact)
                }
                _ => (None, None),
            };

            ReportSummary::Outcome(OutcomeSummary {
                overall_positive_rate: round6(overall),
                demographic_parity_diff: dp_diff,
                disparate_impact,
                max_group_positive_rate: max_rate.map(round6),
                min_group_positive_rate: min_rate.map(round6),
            })
        }
        None => {
            // Ratio of counts equals the ratio of shares without rounding noise
            let counts: Vec<usize> = groups.iter().map(|g| g.n).collect();
            let max_n = counts.iter().copied().max();
            let min_n = counts.iter().copied().min();
            let imbalance_ratio = match (max_n, min_n) {
                (Some(max), Some(min)) if counts.len() > 1 && min > 0 => {
                    Some(round6(max as f64 / min as f64))
                }
                _ => None,
            };
            ReportSummary::Distribution { imbalance_ratio }
        }
    };

    debug!(
        sensitive = %config.sensitive,
        groups = groups.len(),
        total_rows = total,
        "computed bias report"
    );

    Ok(BiasReport {
        sensitive: config.sensitive.clone(),
        target: config.target.clone(),
        positive_label,
        total_rows: total,
        groups,
        summary,
        warnings,
    })
}
