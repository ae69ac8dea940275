//! Command-line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Dated journal with week and longterm carry-over sections.
#[derive(Parser, Debug)]
#[command(name = "datebook", version, about)]
pub struct Cli {
    /// What to do with the entry.
    #[arg(short, long, value_enum, default_value_t = Action::Open)]
    pub action: Action,

    /// Journal directory; created when missing. Defaults to ~/.datebook.
    #[arg(short, long, env = "DATEBOOK_DIR")]
    pub directory: Option<PathBuf>,

    /// Template for new entries. Defaults to ~/.datebook.md when present.
    #[arg(short, long, env = "DATEBOOK_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Editor command used by `open`.
    #[arg(long, env = "EDITOR")]
    pub editor: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Absolute log directory. Defaults to the platform data directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Entry date, e.g. `yesterday`, `last friday`, `2024-03-15`.
    #[arg(trailing_var_arg = true)]
    pub date: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Compose, edit in $EDITOR, split back out and commit.
    Open,
    /// Compose and print the entry path; saving is deferred to `cleanup`.
    Print,
    /// Finish the save/commit of a previous `print`.
    Cleanup,
}
