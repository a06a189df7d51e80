//! JSON configuration file and merging with command-line flags

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use super::args::{ColumnArgs, MitigateArgs};
use crate::bias::{AdjustOptions, BiasConfig, Label, QuotaPolicy, RankingQuota, Strategy};

/// Settings accepted from a `--config` file. Every field is optional;
/// command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub sensitive: Option<String>,
    pub target: Option<String>,
    pub positive_label: Option<Label>,
    pub strategy: Option<Strategy>,
}

/// Read a configuration file, or return the empty configuration when no
/// path is given
pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Build the column selection from flags, falling back to the file
pub fn resolve_bias_config(args: &ColumnArgs, file: &FileConfig) -> Result<BiasConfig> {
    let sensitive = args
        .sensitive
        .clone()
        .or_else(|| file.sensitive.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Sensitive column is required. Use -s/--sensitive or set it in --config."
            )
        })?;

    Ok(BiasConfig {
        sensitive,
        target: args.target.clone().or_else(|| file.target.clone()),
        positive_label: args
            .positive_label
            .as_deref()
            .map(Label::parse)
            .or_else(|| file.positive_label.clone()),
    })
}

/// Build the mitigation strategy.
///
/// `--method` picks the strategy; options from the file are kept when it
/// names the same method. Strategy-specific flags are then layered on top.
pub fn resolve_strategy(args: &MitigateArgs, file: &FileConfig) -> Result<Strategy> {
    let mut strategy = match (&args.method, &file.strategy) {
        (Some(name), Some(from_file)) if from_file.name() == name => from_file.clone(),
        (Some(name), _) => name.parse::<Strategy>()?,
        (None, Some(from_file)) => from_file.clone(),
        (None, None) => Strategy::default(),
    };

    match &mut strategy {
        Strategy::Reweigh => {}
        Strategy::Resample { seed } => {
            if let Some(value) = args.seed {
                *seed = value;
            }
        }
        Strategy::Adjust(options) => apply_adjust_flags(options, args),
    }

    if !matches!(strategy, Strategy::Adjust(_)) && has_adjust_flags(args) {
        warn!(
            method = strategy.name(),
            "adjust options given but ignored by this method"
        );
    }
    if !matches!(strategy, Strategy::Resample { .. }) && args.seed.is_some() {
        warn!(method = strategy.name(), "--seed only applies to resample");
    }

    Ok(strategy)
}

fn has_adjust_flags(args: &MitigateArgs) -> bool {
    args.adjustment_method.is_some()
        || args.modify_original
        || args.threshold.is_some()
        || !args.factors.is_empty()
        || !args.rank_by.is_empty()
}

fn apply_adjust_flags(options: &mut AdjustOptions, args: &MitigateArgs) {
    if let Some(method) = args.adjustment_method {
        options.method = method;
    }
    if args.modify_original {
        options.modify_original = true;
    }
    if let Some(threshold) = args.threshold {
        options.threshold = threshold;
    }
    if !args.factors.is_empty() {
        let factors: BTreeMap<String, f64> = args.factors.iter().cloned().collect();
        options.factors = Some(factors);
    }
    if !args.rank_by.is_empty() {
        let quota = options
            .ranking
            .as_ref()
            .map(|r| r.quota.clone())
            .unwrap_or(QuotaPolicy::Proportional);
        options.ranking = Some(RankingQuota {
            score_columns: args.rank_by.clone(),
            quota,
        });
    }
}
