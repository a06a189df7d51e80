//! Terminal rendering of bias reports and mitigation results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::bias::{AdjustSummary, BiasReport, MitigationStats, ReportSummary};

/// Disparate impact below this fails the four-fifths rule
const FOUR_FIFTHS: f64 = 0.8;

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn section_header(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

/// Print the per-group table, summary metrics and warnings of a report
pub fn display_report(report: &BiasReport) {
    section_header("📋", "BIAS REPORT");

    let with_outcome = report.outcome().is_some();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![
        Cell::new("Group").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new("Share").add_attribute(Attribute::Bold),
    ];
    if with_outcome {
        header.push(Cell::new("Positive Rate").add_attribute(Attribute::Bold));
        header.push(Cell::new("Parity Diff").add_attribute(Attribute::Bold));
    }
    table.set_header(header);

    for group in &report.groups {
        let mut row = vec![
            Cell::new(&group.group),
            Cell::new(group.n),
            Cell::new(format!("{:.1}%", group.share * 100.0)),
        ];
        if with_outcome {
            row.push(Cell::new(fmt_opt(group.positive_rate)));
            let diff = group.statistical_parity_diff.unwrap_or(0.0);
            let color = if diff < 0.0 { Color::Red } else { Color::Green };
            row.push(Cell::new(fmt_opt(group.statistical_parity_diff)).fg(color));
        }
        table.add_row(row);
    }
    print_indented(&table);

    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL_CONDENSED);
    summary.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    summary.add_row(vec![Cell::new("📁 Total Rows"), Cell::new(report.total_rows)]);

    match &report.summary {
        ReportSummary::Outcome(outcome) => {
            if let Some(label) = &report.positive_label {
                summary.add_row(vec![Cell::new("🎯 Positive Label"), Cell::new(label)]);
            }
            summary.add_row(vec![
                Cell::new("📊 Overall Positive Rate"),
                Cell::new(format!("{:.4}", outcome.overall_positive_rate)),
            ]);
            summary.add_row(vec![
                Cell::new("↕️  Demographic Parity Diff"),
                Cell::new(fmt_opt(outcome.demographic_parity_diff)),
            ]);
            let impact_color = match outcome.disparate_impact {
                Some(v) if v < FOUR_FIFTHS => Color::Red,
                Some(_) => Color::Green,
                None => Color::White,
            };
            summary.add_row(vec![
                Cell::new("⚖️  Disparate Impact"),
                Cell::new(fmt_opt(outcome.disparate_impact))
                    .fg(impact_color)
                    .add_attribute(Attribute::Bold),
            ]);
        }
        ReportSummary::Distribution { imbalance_ratio } => {
            summary.add_row(vec![
                Cell::new("⚖️  Imbalance Ratio"),
                Cell::new(fmt_opt(*imbalance_ratio)).add_attribute(Attribute::Bold),
            ]);
        }
    }
    println!();
    print_indented(&summary);

    if !report.warnings.is_empty() {
        println!();
        for warning in &report.warnings {
            println!("    {} {}", style("⚠").yellow().bold(), style(warning).yellow());
        }
    }
}

/// Print what a mitigation run changed
pub fn display_mitigation(stats: &MitigationStats) {
    section_header("🛡️", "MITIGATION SUMMARY");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("🔧 Method"), Cell::new(&stats.method)]);
    table.add_row(vec![Cell::new("📁 Original Rows"), Cell::new(stats.original_rows)]);
    table.add_row(vec![
        Cell::new("✅ Mitigated Rows"),
        Cell::new(stats.mitigated_rows)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);

    match &stats.adjust {
        Some(AdjustSummary::Numeric {
            column,
            original_total,
            adjusted_total,
            ..
        }) => {
            table.add_row(vec![Cell::new("📝 Written Column"), Cell::new(column)]);
            table.add_row(vec![
                Cell::new("Σ Original Total"),
                Cell::new(format!("{:.4}", original_total)),
            ]);
            table.add_row(vec![
                Cell::new("Σ Adjusted Total"),
                Cell::new(format!("{:.4}", adjusted_total)),
            ]);
        }
        Some(AdjustSummary::RankQuota {
            column,
            original_positive,
            adjusted_positive,
            ..
        }) => {
            table.add_row(vec![Cell::new("📝 Written Column"), Cell::new(column)]);
            table.add_row(vec![
                Cell::new("Original Positives"),
                Cell::new(original_positive),
            ]);
            table.add_row(vec![
                Cell::new("Adjusted Positives"),
                Cell::new(adjusted_positive),
            ]);
        }
        None => {}
    }
    print_indented(&table);

    if let Some(adjust) = &stats.adjust {
        display_adjust_groups(adjust);
    }
}

fn display_adjust_groups(summary: &AdjustSummary) {
    println!();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    match summary {
        AdjustSummary::Numeric { groups, .. } => {
            table.set_header(vec![
                Cell::new("Group").add_attribute(Attribute::Bold),
                Cell::new("Rows").add_attribute(Attribute::Bold),
                Cell::new("Factor").add_attribute(Attribute::Bold),
                Cell::new("Mean Before").add_attribute(Attribute::Bold),
                Cell::new("Mean After").add_attribute(Attribute::Bold),
            ]);
            for g in groups {
                table.add_row(vec![
                    Cell::new(&g.group),
                    Cell::new(g.n),
                    Cell::new(fmt_opt(g.factor)),
                    Cell::new(fmt_opt(g.original_mean)),
                    Cell::new(fmt_opt(g.adjusted_mean)),
                ]);
            }
        }
        AdjustSummary::RankQuota { groups, .. } => {
            table.set_header(vec![
                Cell::new("Group").add_attribute(Attribute::Bold),
                Cell::new("Rows").add_attribute(Attribute::Bold),
                Cell::new("Positives Before").add_attribute(Attribute::Bold),
                Cell::new("Quota").add_attribute(Attribute::Bold),
            ]);
            for g in groups {
                table.add_row(vec![
                    Cell::new(&g.group),
                    Cell::new(g.n),
                    Cell::new(g.original_positive),
                    Cell::new(g.quota).fg(Color::Green),
                ]);
            }
        }
    }
    print_indented(&table);
}
