//! Bias Buster: group fairness CLI
//!
//! `analyze` reports fairness metrics for a sensitive column; `mitigate`
//! writes a rebalanced copy of the dataset and reports before and after.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use polars::prelude::DataFrame;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use biasbuster::bias::{compute_bias_report, mitigate, AdjustSummary, Strategy};
use biasbuster::cli::{
    confirm_overwrite, load_file_config, resolve_bias_config, resolve_strategy, AnalyzeArgs, Cli,
    Commands, MitigateArgs,
};
use biasbuster::io::{column_names, load_dataset, save_dataset};
use biasbuster::report::{
    display_mitigation, display_report, export_report, ReportExport, RunMetadata,
};
use biasbuster::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_info, print_step_header, print_step_time, print_success, print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Analyze(args) => run_analyze(args, cli.infer_schema_length),
        Commands::Mitigate(args) => run_mitigate(args, cli.infer_schema_length),
    }
}

/// Log to stderr so tables on stdout stay clean. RUST_LOG overrides `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

/// Load the dataset and report its shape
fn load_step(input: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(input, infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", df.height());
    println!("      Columns: {}", df.width());
    debug!(columns = ?column_names(&df), "dataset columns");
    print_step_time(step_start.elapsed());
    Ok(df)
}

fn run_analyze(args: &AnalyzeArgs, infer_schema_length: usize) -> Result<()> {
    let file_config = load_file_config(args.columns.config.as_deref())?;
    let config = resolve_bias_config(&args.columns, &file_config)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&args.columns.input, &config, None, None);

    print_step_header(1, "Load Dataset");
    let df = load_step(&args.columns.input, infer_schema_length)?;

    print_step_header(2, "Bias Analysis");
    let step_start = Instant::now();
    let report = compute_bias_report(&df, &config)?;
    info!(
        sensitive = %config.sensitive,
        groups = report.groups.len(),
        "bias report computed"
    );
    print_step_time(step_start.elapsed());
    display_report(&report);

    if let Some(path) = &args.report {
        let export = ReportExport {
            metadata: RunMetadata::new(&args.columns.input),
            report: &report,
            mitigation: None,
            mitigated_report: None,
        };
        export_report(&export, path)?;
        print_success(&format!("Report written to {}", path.display()));
    }

    print_completion("Bias analysis complete!");
    Ok(())
}

fn run_mitigate(args: &MitigateArgs, infer_schema_length: usize) -> Result<()> {
    let file_config = load_file_config(args.columns.config.as_deref())?;
    let config = resolve_bias_config(&args.columns, &file_config)?;
    let strategy = resolve_strategy(args, &file_config)?;
    let output_path = args.output_path(strategy.name());

    if !confirm_overwrite(&output_path, args.no_confirm)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &args.columns.input,
        &config,
        Some(&strategy),
        Some(&output_path),
    );

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let df = load_step(&args.columns.input, infer_schema_length)?;

    // Step 2: Report before mitigation
    print_step_header(2, "Bias Analysis (before)");
    let before = compute_bias_report(&df, &config)?;
    display_report(&before);

    // Step 3: Mitigate
    print_step_header(3, "Mitigation");
    let step_start = Instant::now();
    let spinner = create_spinner(&format!("Applying {}...", strategy.name()));
    let mut mitigated = mitigate(&df, &config, &strategy)?;
    finish_with_success(&spinner, "Mitigation complete");
    print_step_time(step_start.elapsed());
    display_mitigation(&mitigated.stats);

    // Step 4: Report after mitigation
    print_step_header(4, "Bias Analysis (after)");
    let after = compute_bias_report(&mitigated.data, &config)?;
    if let Some(AdjustSummary::Numeric { column, .. }) = &mitigated.stats.adjust {
        if config.target.as_deref() != Some(column.as_str()) {
            print_info(&format!(
                "Target left unchanged; adjusted values written to '{}'",
                column
            ));
        }
    }
    if matches!(strategy, Strategy::Reweigh) {
        print_warning("Reweighing leaves outcomes unchanged; apply sample_weight when training.");
    }
    display_report(&after);

    // Step 5: Save output
    print_step_header(5, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output file...");
    save_dataset(&mut mitigated.data, &output_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));
    print_step_time(step_start.elapsed());

    if let Some(path) = &args.report {
        let export = ReportExport {
            metadata: RunMetadata::new(&args.columns.input),
            report: &before,
            mitigation: Some(&mitigated.stats),
            mitigated_report: Some(&after),
        };
        export_report(&export, path)?;
        print_success(&format!("Report written to {}", path.display()));
    }

    print_completion("Bias mitigation complete!");
    Ok(())
}
