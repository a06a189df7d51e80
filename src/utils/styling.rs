//! Terminal styling utilities

use std::path::Path;
use std::time::Duration;

use console::{style, Emoji};

use crate::bias::{BiasConfig, Strategy};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static SCALES: Emoji<'_, '_> = Emoji("⚖️  ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static GROUP: Emoji<'_, '_> = Emoji("👥 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static TOOLS: Emoji<'_, '_> = Emoji("🛠️  ", "");

const BOX_WIDTH: usize = 56;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {}{}",
        SCALES,
        style("B I A S   B U S T E R").cyan().bold()
    );
    println!(
        "    {}",
        style("Measure and mitigate group bias in tabular data").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

fn config_row(icon: &Emoji<'_, '_>, label: &str, value: &str) {
    println!("    │  {} {:<8} {:<38}│", icon, label, truncate_string(value, 38));
}

/// Print configuration card
pub fn print_config(
    input: &Path,
    config: &BiasConfig,
    strategy: Option<&Strategy>,
    output: Option<&Path>,
) {
    let line = "─".repeat(BOX_WIDTH - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(BOX_WIDTH - 20)
    );
    println!("    ├{}┤", line);
    config_row(&FOLDER, "Input:", &truncate_path(input, 38));
    config_row(&GROUP, "Group:", &config.sensitive);
    config_row(
        &TARGET,
        "Target:",
        config.target.as_deref().unwrap_or("(none)"),
    );
    if let Some(label) = &config.positive_label {
        config_row(&TARGET, "Label:", &label.to_string());
    }
    if let Some(strategy) = strategy {
        config_row(&TOOLS, "Method:", strategy.name());
    }
    if let Some(output) = output {
        config_row(&SAVE, "Output:", &truncate_path(output, 38));
    }
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}",
        style(format!("({:.2}s)", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {}{}", SCALES, style(message).green().bold());
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "...hijkl");
    }
}
