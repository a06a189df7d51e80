//! CLI module - argument parsing, config files and interactive prompts

mod args;
pub mod config;
mod prompts;

pub use args::{AnalyzeArgs, Cli, ColumnArgs, Commands, MitigateArgs};
pub use config::{load_file_config, resolve_bias_config, resolve_strategy, FileConfig};
pub use prompts::*;
