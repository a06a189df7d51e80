//! Value adjustment mitigation
//!
//! Two modes:
//!
//! - **Numeric adjustment**: scale (`multiply`) or shift (`add`) target values
//!   per group so group means converge on the overall mean. Factors are
//!   derived from the data unless the caller supplies them.
//! - **Rank and quota**: for binary outcomes overwritten in place, hand out
//!   the current number of positive outcomes to groups by a quota policy and
//!   give them to the best-ranked rows of each group.

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::{AdjustMethod, AdjustOptions, BiasConfig, RankingQuota};
use super::error::{BiasError, Result};
use super::label::{positive_mask, resolve_positive_label};
use super::values::{
    column_labels, compare_keys, key_name, labels_to_series, numeric_values, partition,
    require_column, Label,
};

/// Column written when the target is left untouched
pub fn adjusted_column_name(target: &str) -> String {
    format!("{}_adjusted", target)
}

/// Column preserving the pre-adjustment target values
pub fn original_column_name(target: &str) -> String {
    format!("original_{}", target)
}

/// Per-group outcome of a numeric adjustment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAdjustment {
    pub group: String,
    pub n: usize,
    /// Factor applied to the group, `None` when values were left unchanged
    pub factor: Option<f64>,
    pub original_mean: Option<f64>,
    pub adjusted_mean: Option<f64>,
}

/// Per-group outcome of a rank-and-quota rebalancing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupQuota {
    pub group: String,
    pub n: usize,
    pub quota: usize,
    pub original_positive: usize,
    pub adjusted_positive: usize,
}

/// Before/after statistics of an adjustment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AdjustSummary {
    Numeric {
        column: String,
        method: AdjustMethod,
        overall_mean: Option<f64>,
        original_total: f64,
        adjusted_total: f64,
        groups: Vec<GroupAdjustment>,
    },
    RankQuota {
        column: String,
        positive_label: Label,
        original_positive: usize,
        adjusted_positive: usize,
        groups: Vec<GroupQuota>,
    },
}

/// Adjusted dataset with its summary
#[derive(Debug, Clone)]
pub struct Adjusted {
    pub data: DataFrame,
    pub summary: AdjustSummary,
}

fn mean<'a>(values: impl Iterator<Item = &'a f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}

/// Adjust the target column of `df` per sensitive group.
///
/// Rank-and-quota mode runs when `options.modify_original` is set and a
/// ranking is configured; otherwise the numeric adjustment runs.
///
/// # Errors
/// - `InvalidArgument` when no target column is configured
/// - `ColumnNotFound` for absent sensitive, target or score columns
/// - `TypeMismatch` when the target (numeric mode) or a score column is not numeric
/// - `DegenerateInput` when rank-and-quota cannot determine the outcome labels
pub fn adjust(df: &DataFrame, config: &BiasConfig, options: &AdjustOptions) -> Result<Adjusted> {
    let target = config.target.as_deref().ok_or_else(|| {
        BiasError::InvalidArgument("target column is required for the adjust method".to_string())
    })?;
    let sensitive = column_labels(df, &config.sensitive)?;
    require_column(df, target)?;

    match (&options.ranking, options.modify_original) {
        (Some(ranking), true) => rank_and_quota(df, config, target, &sensitive, ranking, options),
        (ranking, _) => {
            if ranking.is_some() {
                warn!("ranking is only applied with modify_original; running numeric adjustment");
            }
            adjust_numeric(df, target, &sensitive, options)
        }
    }
}

fn adjust_numeric(
    df: &DataFrame,
    target: &str,
    sensitive: &[Option<Label>],
    options: &AdjustOptions,
) -> Result<Adjusted> {
    let values = numeric_values(df, target)?;
    let overall_mean = mean(values.iter().flatten());

    let mut partitions = partition(sensitive);
    partitions.sort_by(|a, b| compare_keys(&a.0, &b.0));

    let mut adjusted = values.clone();
    let mut factors = Vec::with_capacity(partitions.len());
    for (key, rows) in &partitions {
        let name = key_name(key);
        let group_mean = mean(rows.iter().filter_map(|&row| values[row].as_ref()));

        let factor = match &options.factors {
            Some(explicit) => explicit.get(&name).copied(),
            None => match (overall_mean, group_mean, options.method) {
                (Some(overall), Some(group), AdjustMethod::Multiply) if group != 0.0 => {
                    Some(overall / group)
                }
                (Some(overall), Some(group), AdjustMethod::Add) => Some(overall - group),
                _ => None,
            },
        };
        debug!(group = %name, ?factor, ?group_mean, "adjustment factor");

        if let Some(factor) = factor {
            for &row in rows {
                adjusted[row] = values[row].map(|v| match options.method {
                    AdjustMethod::Multiply => v * factor,
                    AdjustMethod::Add => v + factor,
                });
            }
        }
        factors.push((name, group_mean, factor));
    }

    let mut out = df.clone();
    let column = if options.modify_original {
        let binary = values.iter().flatten().next().is_some()
            && values.iter().flatten().all(|&v| v == 0.0 || v == 1.0);
        if binary {
            // Back to a 0/1 label with the threshold
            adjusted = adjusted
                .iter()
                .map(|v| v.map(|x| if x > options.threshold { 1.0 } else { 0.0 }))
                .collect();
            let labels: Vec<Option<i64>> = adjusted.iter().map(|v| v.map(|x| x as i64)).collect();
            out.with_column(Series::new(target.into(), labels))?;
        } else {
            out.with_column(Series::new(target.into(), adjusted.clone()))?;
        }
        if options.keep_original {
            keep_original_column(df, &mut out, target)?;
        }
        target.to_string()
    } else {
        let name = adjusted_column_name(target);
        out.with_column(Series::new(name.as_str().into(), adjusted.clone()))?;
        name
    };

    let groups = partitions
        .iter()
        .zip(factors)
        .map(|((_, rows), (group, original_mean, factor))| GroupAdjustment {
            group,
            n: rows.len(),
            factor,
            original_mean,
            adjusted_mean: mean(rows.iter().filter_map(|&row| adjusted[row].as_ref())),
        })
        .collect();

    Ok(Adjusted {
        data: out,
        summary: AdjustSummary::Numeric {
            column,
            method: options.method,
            overall_mean,
            original_total: values.iter().flatten().sum(),
            adjusted_total: adjusted.iter().flatten().sum(),
            groups,
        },
    })
}

fn keep_original_column(df: &DataFrame, out: &mut DataFrame, target: &str) -> Result<()> {
    let original = require_column(df, target)?
        .as_materialized_series()
        .clone()
        .with_name(original_column_name(target).as_str().into());
    out.with_column(original)?;
    Ok(())
}

fn rank_and_quota(
    df: &DataFrame,
    config: &BiasConfig,
    target: &str,
    sensitive: &[Option<Label>],
    ranking: &RankingQuota,
    options: &AdjustOptions,
) -> Result<Adjusted> {
    if ranking.score_columns.is_empty() {
        return Err(BiasError::InvalidArgument(
            "ranking requires at least one score column".to_string(),
        ));
    }

    let outcome = column_labels(df, target)?;
    let requested = resolve_positive_label(config.positive_label.as_ref(), &outcome).ok_or_else(
        || BiasError::DegenerateInput(format!("cannot determine positive outcome of '{}'", target)),
    )?;
    // Write the dataset's own cell value so the column keeps its type
    let positive = outcome
        .iter()
        .flatten()
        .find(|value| value.matches(&requested))
        .cloned()
        .unwrap_or_else(|| Label::parse(&requested.to_string()));

    let mut negatives: Vec<&Label> = Vec::new();
    for value in outcome.iter().flatten() {
        if !value.matches(&positive) && !negatives.contains(&value) {
            negatives.push(value);
        }
    }
    if negatives.len() > 1 {
        return Err(BiasError::InvalidArgument(format!(
            "rank-and-quota requires a binary outcome; '{}' has {} non-positive values",
            target,
            negatives.len()
        )));
    }
    let negative = match negatives.first() {
        Some(&label) => label.clone(),
        None if positive.as_number().is_some() => Label::Number(0.0),
        None => {
            return Err(BiasError::DegenerateInput(format!(
                "'{}' has no negative outcome to assign",
                target
            )))
        }
    };

    // Composite score: sum of the score columns, missing counts as zero
    let mut scores = vec![0.0; df.height()];
    for name in &ranking.score_columns {
        for (score, value) in scores.iter_mut().zip(numeric_values(df, name)?) {
            *score += value.unwrap_or(0.0);
        }
    }

    let mask = positive_mask(&outcome, &positive);
    let total_positive = mask.iter().filter(|&&p| p).count();

    let mut partitions = partition(sensitive);
    partitions.sort_by(|a, b| compare_keys(&a.0, &b.0));
    let sizes: Vec<(String, usize)> = partitions
        .iter()
        .map(|(key, rows)| (key_name(key), rows.len()))
        .collect();
    let quotas = ranking.quota.quotas(&sizes, total_positive);

    let mut rebalanced: Vec<Option<Label>> = vec![Some(negative); df.height()];
    let mut groups = Vec::with_capacity(partitions.len());
    for ((key, rows), &quota) in partitions.iter().zip(quotas.iter()) {
        let mut ranked = rows.clone();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        for &row in ranked.iter().take(quota) {
            rebalanced[row] = Some(positive.clone());
        }
        groups.push(GroupQuota {
            group: key_name(key),
            n: rows.len(),
            quota,
            original_positive: rows.iter().filter(|&&row| mask[row]).count(),
            adjusted_positive: quota.min(rows.len()),
        });
    }
    debug!(total_positive, groups = groups.len(), "rank-and-quota rebalancing");

    let dtype = require_column(df, target)?.dtype().clone();
    let mut out = df.clone();
    out.with_column(labels_to_series(target, &rebalanced, &dtype))?;
    if options.keep_original {
        keep_original_column(df, &mut out, target)?;
    }

    let adjusted_positive = groups.iter().map(|g| g.adjusted_positive).sum();
    Ok(Adjusted {
        data: out,
        summary: AdjustSummary::RankQuota {
            column: target.to_string(),
            positive_label: positive,
            original_positive: total_positive,
            adjusted_positive,
            groups,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::config::QuotaPolicy;
    use std::collections::BTreeMap;

    fn salary_frame() -> DataFrame {
        df! {
            "gender" => ["M", "M", "F", "F"],
            "salary" => [100.0f64, 120.0, 60.0, 80.0],
        }
        .unwrap()
    }

    fn column_f64(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_multiply_equalizes_group_means() {
        let df = salary_frame();
        let config = BiasConfig::new("gender").with_target("salary");
        let adjusted = adjust(&df, &config, &AdjustOptions::default()).unwrap();

        // Overall mean 90: F factor 90/70, M factor 90/110
        let values = column_f64(&adjusted.data, "salary_adjusted");
        assert!((values[0].unwrap() - 100.0 * 90.0 / 110.0).abs() < 1e-9);
        assert!((values[2].unwrap() - 60.0 * 90.0 / 70.0).abs() < 1e-9);
        assert_eq!(column_f64(&adjusted.data, "salary"), column_f64(&df, "salary"));

        let AdjustSummary::Numeric { groups, .. } = adjusted.summary else {
            panic!("Expected numeric summary");
        };
        for group in groups {
            assert!((group.adjusted_mean.unwrap() - 90.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_add_shifts_group_means() {
        let df = salary_frame();
        let config = BiasConfig::new("gender").with_target("salary");
        let options = AdjustOptions {
            method: AdjustMethod::Add,
            ..Default::default()
        };
        let adjusted = adjust(&df, &config, &options).unwrap();
        let values = column_f64(&adjusted.data, "salary_adjusted");
        assert_eq!(values, vec![Some(80.0), Some(100.0), Some(80.0), Some(100.0)]);
    }

    #[test]
    fn test_explicit_factors_used_as_given() {
        let df = salary_frame();
        let config = BiasConfig::new("gender").with_target("salary");
        let mut factors = BTreeMap::new();
        factors.insert("F".to_string(), 1.5);
        let options = AdjustOptions {
            factors: Some(factors),
            ..Default::default()
        };
        let adjusted = adjust(&df, &config, &options).unwrap();
        let values = column_f64(&adjusted.data, "salary_adjusted");
        // M has no factor and is unchanged
        assert_eq!(values, vec![Some(100.0), Some(120.0), Some(90.0), Some(120.0)]);
    }

    #[test]
    fn test_modify_original_binary_uses_threshold() {
        let df = df! {
            "gender" => ["M", "M", "M", "F", "F", "F"],
            "hired" => [1i64, 1, 0, 1, 0, 0],
        }
        .unwrap();
        let config = BiasConfig::new("gender").with_target("hired");
        let options = AdjustOptions {
            modify_original: true,
            threshold: 0.5,
            ..Default::default()
        };
        let adjusted = adjust(&df, &config, &options).unwrap();

        // Overall mean 0.5: M factor 0.75, F factor 1.5
        let hired: Vec<Option<i64>> = adjusted
            .data
            .column("hired")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(hired, vec![Some(1), Some(1), Some(0), Some(1), Some(0), Some(0)]);
        assert!(adjusted.data.column("original_hired").is_ok());
        assert!(adjusted.data.column("hired_adjusted").is_err());
    }

    #[test]
    fn test_missing_target_is_invalid_argument() {
        let df = salary_frame();
        let err = adjust(&df, &BiasConfig::new("gender"), &AdjustOptions::default()).unwrap_err();
        assert!(matches!(err, BiasError::InvalidArgument(_)));
    }

    #[test]
    fn test_non_numeric_target_is_type_mismatch() {
        let df = df! {
            "gender" => ["M", "F"],
            "grade" => ["high", "low"],
        }
        .unwrap();
        let config = BiasConfig::new("gender").with_target("grade");
        let err = adjust(&df, &config, &AdjustOptions::default()).unwrap_err();
        assert!(matches!(err, BiasError::TypeMismatch { .. }));
    }

    fn hiring_frame() -> DataFrame {
        df! {
            "gender" => ["M", "M", "M", "M", "F", "F", "F", "F"],
            "hired" => [1i64, 1, 1, 0, 0, 0, 0, 1],
            "skill" => [9.0f64, 8.0, 7.0, 6.0, 9.0, 5.0, 8.0, 4.0],
            "experience" => [1.0f64, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        }
        .unwrap()
    }

    fn ranking_options() -> AdjustOptions {
        AdjustOptions {
            modify_original: true,
            ranking: Some(RankingQuota {
                score_columns: vec!["skill".to_string(), "experience".to_string()],
                quota: QuotaPolicy::Proportional,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_and_quota_gives_top_ranked_rows_the_quota() {
        let df = hiring_frame();
        let config = BiasConfig::new("gender").with_target("hired");
        let adjusted = adjust(&df, &config, &ranking_options()).unwrap();

        let hired: Vec<Option<i64>> = adjusted
            .data
            .column("hired")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            hired,
            vec![Some(1), Some(1), Some(0), Some(0), Some(1), Some(0), Some(1), Some(0)]
        );

        let AdjustSummary::RankQuota {
            original_positive,
            adjusted_positive,
            groups,
            ..
        } = adjusted.summary
        else {
            panic!("Expected rank-quota summary");
        };
        assert_eq!(original_positive, 4);
        assert_eq!(adjusted_positive, 4);
        assert_eq!(groups[0].group, "F");
        assert_eq!(groups[0].original_positive, 1);
        assert_eq!(groups[0].adjusted_positive, 2);
    }

    #[test]
    fn test_rank_and_quota_keeps_integer_target_with_text_label() {
        let df = df! {
            "gender" => ["M", "M", "F", "F"],
            "hired" => [1i64, 1, 0, 0],
            "skill" => [4.0f64, 3.0, 2.0, 1.0],
        }
        .unwrap();
        let config = BiasConfig::new("gender")
            .with_target("hired")
            .with_positive_label(Label::Text("1".to_string()));
        let adjusted = adjust(&df, &config, &ranking_options_with("skill")).unwrap();

        let hired = adjusted.data.column("hired").unwrap();
        assert_eq!(hired.dtype(), &DataType::Int64);
        let values: Vec<Option<i64>> = hired.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1), Some(0), Some(1), Some(0)]);

        let AdjustSummary::RankQuota { positive_label, .. } = adjusted.summary else {
            panic!("Expected rank-quota summary");
        };
        assert_eq!(positive_label, Label::Number(1.0));
    }

    #[test]
    fn test_rank_and_quota_missing_score_column() {
        let df = hiring_frame();
        let config = BiasConfig::new("gender").with_target("hired");
        let mut options = ranking_options();
        if let Some(ranking) = options.ranking.as_mut() {
            ranking.score_columns.push("interview".to_string());
        }
        let err = adjust(&df, &config, &options).unwrap_err();
        assert!(matches!(err, BiasError::ColumnNotFound(name) if name == "interview"));
    }

    #[test]
    fn test_rank_and_quota_rejects_multi_valued_outcome() {
        let df = df! {
            "gender" => ["M", "F", "F"],
            "decision" => ["hire", "reject", "waitlist"],
            "skill" => [1.0f64, 2.0, 3.0],
        }
        .unwrap();
        let config = BiasConfig::new("gender")
            .with_target("decision")
            .with_positive_label("hire");
        let err = adjust(&df, &config, &ranking_options_with("skill")).unwrap_err();
        assert!(matches!(err, BiasError::InvalidArgument(_)));
    }

    fn ranking_options_with(column: &str) -> AdjustOptions {
        AdjustOptions {
            modify_original: true,
            ranking: Some(RankingQuota {
                score_columns: vec![column.to_string()],
                quota: QuotaPolicy::Proportional,
            }),
            ..Default::default()
        }
    }
}
