//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::bias::AdjustMethod;

/// Bias Buster - measure and mitigate group bias in tabular datasets
#[derive(Parser, Debug)]
#[command(name = "biasbuster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000", global = true)]
    pub infer_schema_length: usize,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute group fairness metrics for a sensitive column
    Analyze(AnalyzeArgs),

    /// Write a bias-mitigated copy of the dataset
    Mitigate(MitigateArgs),
}

/// Dataset and column selection shared by all commands
#[derive(Args, Debug, Clone)]
pub struct ColumnArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Sensitive attribute column whose values define the groups.
    /// Required unless provided by --config.
    #[arg(short, long)]
    pub sensitive: Option<String>,

    /// Target (outcome) column. Optional for analyze, reweigh and resample.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Target value that represents the favourable outcome.
    /// Inferred from the target column when omitted.
    #[arg(long)]
    pub positive_label: Option<String>,

    /// JSON configuration file (sensitive, target, positive_label, strategy).
    /// Command-line flags override values from the file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Write the report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MitigateArgs {
    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Mitigation method: reweigh, resample, or adjust (default: reweigh)
    #[arg(short, long, value_parser = ["reweigh", "resample", "adjust"])]
    pub method: Option<String>,

    /// How adjust applies factors: multiply or add
    #[arg(long, value_parser = parse_adjust_method)]
    pub adjustment_method: Option<AdjustMethod>,

    /// Overwrite the target column instead of writing <target>_adjusted
    #[arg(long, default_value = "false")]
    pub modify_original: bool,

    /// Threshold for converting adjusted values back to a 0/1 label (0.0 to 1.0)
    #[arg(long, value_parser = validate_threshold)]
    pub threshold: Option<f64>,

    /// Explicit adjustment factor for a group, as GROUP=FACTOR. Repeatable.
    #[arg(long = "factor", value_parser = parse_factor)]
    pub factors: Vec<(String, f64)>,

    /// Score columns (comma-separated) ranking rows for rank-and-quota
    /// rebalancing. Requires --modify-original.
    #[arg(long, value_delimiter = ',')]
    pub rank_by: Vec<String>,

    /// Seed for resampling draws
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file path (CSV or Parquet, determined by extension).
    /// Defaults to the input directory with a '_mitigated_<method>' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write before/after reports and mitigation statistics as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Overwrite an existing output file without asking
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

impl MitigateArgs {
    /// Get the output path, deriving from input if not explicitly provided.
    /// The derived path will be in the same directory as the input with a
    /// '_mitigated_<method>' suffix.
    pub fn output_path(&self, method: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_output_path(&self.columns.input, method))
    }
}

fn derive_output_path(input: &Path, method: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv");
    parent.join(format!("{}_mitigated_{}.{}", stem, method, extension))
}

fn parse_adjust_method(s: &str) -> Result<AdjustMethod, String> {
    s.parse::<AdjustMethod>().map_err(|e| e.to_string())
}

/// Validator for the threshold parameter
fn validate_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("threshold must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Parser for GROUP=FACTOR pairs; the last '=' separates the factor
fn parse_factor(s: &str) -> Result<(String, f64), String> {
    let (group, factor) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("'{}' must have the form GROUP=FACTOR", s))?;
    let factor: f64 = factor
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid factor", factor))?;
    if !factor.is_finite() {
        return Err(format!("factor for '{}' must be finite", group));
    }
    Ok((group.to_string(), factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_factor() {
        assert_eq!(parse_factor("F=1.25").unwrap(), ("F".to_string(), 1.25));
        assert_eq!(parse_factor("a=b=2").unwrap(), ("a=b".to_string(), 2.0));
        assert!(parse_factor("F").is_err());
        assert!(parse_factor("F=abc").is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert_eq!(validate_threshold("0.7").unwrap(), 0.7);
        assert!(validate_threshold("1.5").is_err());
        assert!(validate_threshold("x").is_err());
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("/data/hiring.csv"), "resample"),
            PathBuf::from("/data/hiring_mitigated_resample.csv")
        );
    }
}
