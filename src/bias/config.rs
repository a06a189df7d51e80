//! Column selection and mitigation strategy configuration

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::BiasError;
use super::values::Label;

/// Seed used for resampling draws unless the caller picks another
pub const DEFAULT_SEED: u64 = 42;

/// Threshold for turning adjusted scores back into a binary label
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Which columns to analyse and which outcome counts as favourable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasConfig {
    /// Categorical column whose values define the groups
    pub sensitive: String,
    /// Optional outcome column
    #[serde(default)]
    pub target: Option<String>,
    /// Favourable outcome; inferred from the target when absent
    #[serde(default)]
    pub positive_label: Option<Label>,
}

impl BiasConfig {
    pub fn new(sensitive: impl Into<String>) -> Self {
        Self {
            sensitive: sensitive.into(),
            target: None,
            positive_label: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_positive_label(mut self, label: impl Into<Label>) -> Self {
        self.positive_label = Some(label.into());
        self
    }
}

/// How adjustment factors are applied to target values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustMethod {
    #[default]
    Multiply,
    Add,
}

impl fmt::Display for AdjustMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustMethod::Multiply => write!(f, "multiply"),
            AdjustMethod::Add => write!(f, "add"),
        }
    }
}

impl FromStr for AdjustMethod {
    type Err = BiasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "multiply" => Ok(AdjustMethod::Multiply),
            "add" => Ok(AdjustMethod::Add),
            other => Err(BiasError::InvalidArgument(format!(
                "unknown adjustment method '{}'. Use multiply or add",
                other
            ))),
        }
    }
}

/// How many positive outcomes each group receives in rank-and-quota mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPolicy {
    /// Share the current number of positives in proportion to group size
    #[default]
    Proportional,
    /// Fixed number of positives per group value
    Fixed(BTreeMap<String, usize>),
}

impl QuotaPolicy {
    /// Positive quota for each group given `(group name, group size)` pairs
    /// and the number of positives currently in the dataset. Quotas never
    /// exceed the group size.
    pub fn quotas(&self, groups: &[(String, usize)], total_positive: usize) -> Vec<usize> {
        let total: usize = groups.iter().map(|(_, n)| n).sum();
        groups
            .iter()
            .map(|(name, n)| {
                let quota = match self {
                    QuotaPolicy::Proportional if total > 0 => {
                        (*n as f64 / total as f64 * total_positive as f64).round() as usize
                    }
                    QuotaPolicy::Proportional => 0,
                    QuotaPolicy::Fixed(map) => map.get(name).copied().unwrap_or(0),
                };
                quota.min(*n)
            })
            .collect()
    }
}

/// Rank rows by a composite score and hand out positives by quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingQuota {
    /// Numeric columns summed into the ranking score
    pub score_columns: Vec<String>,
    #[serde(default)]
    pub quota: QuotaPolicy,
}

/// Options for the adjust transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustOptions {
    #[serde(rename = "adjustment_method")]
    pub method: AdjustMethod,
    /// Overwrite the target instead of writing `<target>_adjusted`
    pub modify_original: bool,
    /// Cut-off when converting adjusted values back to a 0/1 label
    pub threshold: f64,
    /// Explicit per-group factors keyed by group value
    pub factors: Option<BTreeMap<String, f64>>,
    /// Rank-and-quota rebalancing, used together with `modify_original`
    pub ranking: Option<RankingQuota>,
    /// Add `original_<target>` when the target is overwritten
    pub keep_original: bool,
}

impl Default for AdjustOptions {
    fn default() -> Self {
        Self {
            method: AdjustMethod::default(),
            modify_original: false,
            threshold: DEFAULT_THRESHOLD,
            factors: None,
            ranking: None,
            keep_original: true,
        }
    }
}

/// Mitigation strategy and its options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Reweigh,
    Resample {
        #[serde(default = "default_seed")]
        seed: u64,
    },
    Adjust(AdjustOptions),
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Reweigh => "reweigh",
            Strategy::Resample { .. } => "resample",
            Strategy::Adjust(_) => "adjust",
        }
    }
}

impl FromStr for Strategy {
    type Err = BiasError;

    /// Parse a strategy name with default options
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reweigh" => Ok(Strategy::Reweigh),
            "resample" => Ok(Strategy::Resample { seed: DEFAULT_SEED }),
            "adjust" => Ok(Strategy::Adjust(AdjustOptions::default())),
            other => Err(BiasError::InvalidArgument(format!(
                "unknown method '{}'. Use reweigh, resample, or adjust",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("reweigh".parse::<Strategy>().unwrap(), Strategy::Reweigh);
        assert_eq!(
            "Resample".parse::<Strategy>().unwrap(),
            Strategy::Resample { seed: 42 }
        );
        assert!(matches!(
            "adjust".parse::<Strategy>().unwrap(),
            Strategy::Adjust(_)
        ));
        let err = "shuffle".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, BiasError::InvalidArgument(_)));
    }

    #[test]
    fn test_adjust_method_from_str() {
        assert_eq!("add".parse::<AdjustMethod>().unwrap(), AdjustMethod::Add);
        assert!("divide".parse::<AdjustMethod>().is_err());
    }

    #[test]
    fn test_adjust_options_defaults() {
        let options = AdjustOptions::default();
        assert_eq!(options.method, AdjustMethod::Multiply);
        assert!(!options.modify_original);
        assert_eq!(options.threshold, 0.5);
        assert!(options.keep_original);
    }

    #[test]
    fn test_strategy_deserializes_from_json() {
        let strategy: Strategy = serde_json::from_str(
            r#"{"method": "adjust", "adjustment_method": "add", "modify_original": true,
                "ranking": {"score_columns": ["skill", "experience"]}}"#,
        )
        .unwrap();

        let Strategy::Adjust(options) = strategy else {
            panic!("Expected adjust strategy");
        };
        assert_eq!(options.method, AdjustMethod::Add);
        assert!(options.modify_original);
        assert_eq!(options.threshold, DEFAULT_THRESHOLD);
        let ranking = options.ranking.unwrap();
        assert_eq!(ranking.score_columns, vec!["skill", "experience"]);
        assert_eq!(ranking.quota, QuotaPolicy::Proportional);
    }

    #[test]
    fn test_resample_seed_defaults() {
        let strategy: Strategy = serde_json::from_str(r#"{"method": "resample"}"#).unwrap();
        assert_eq!(strategy, Strategy::Resample { seed: DEFAULT_SEED });
    }

    #[test]
    fn test_proportional_quotas() {
        let groups = vec![("M".to_string(), 6), ("F".to_string(), 4)];
        assert_eq!(QuotaPolicy::Proportional.quotas(&groups, 5), vec![3, 2]);
    }

    #[test]
    fn test_fixed_quotas_capped_by_group_size() {
        let mut map = BTreeMap::new();
        map.insert("M".to_string(), 10);
        let groups = vec![("M".to_string(), 3), ("F".to_string(), 4)];
        assert_eq!(QuotaPolicy::Fixed(map).quotas(&groups, 5), vec![3, 0]);
    }
}
