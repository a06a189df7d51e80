//! JSON export of bias reports and mitigation statistics

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::bias::{BiasReport, MitigationStats};

/// Metadata about the run that produced an export
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Bias Buster version
    pub version: String,
    /// Input file path
    pub input_file: String,
}

impl RunMetadata {
    pub fn new(input_file: &Path) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.display().to_string(),
        }
    }
}

/// A bias report, optionally followed by a mitigation run, with metadata
#[derive(Debug, Serialize)]
pub struct ReportExport<'a> {
    pub metadata: RunMetadata,
    pub report: &'a BiasReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<&'a MitigationStats>,
    /// Report recomputed on the mitigated dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigated_report: Option<&'a BiasReport>,
}

/// Write an export to `output_path` as pretty-printed JSON
pub fn export_report(export: &ReportExport<'_>, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export).context("Failed to serialize bias report")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    Ok(())
}
