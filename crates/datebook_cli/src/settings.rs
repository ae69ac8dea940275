//! Resolution of journal settings from arguments, environment and home.
//!
//! Precedence: flag, then environment (handled by clap), then defaults
//! relative to the home directory.

use crate::cli::Cli;
use datebook_core::config::DEFAULT_EDITOR;
use datebook_core::{ConfigError, JournalConfig};
use std::path::{Path, PathBuf};

const DEFAULT_ROOT_NAME: &str = ".datebook";
const DEFAULT_TEMPLATE_NAME: &str = ".datebook.md";

/// Builds the journal config for this invocation.
pub fn resolve_config(cli: &Cli) -> Result<JournalConfig, ConfigError> {
    let home = dirs::home_dir();
    resolve_with_home(cli, home.as_deref())
}

fn resolve_with_home(cli: &Cli, home: Option<&Path>) -> Result<JournalConfig, ConfigError> {
    let root = match (&cli.directory, home) {
        (Some(dir), _) => dir.clone(),
        (None, Some(home)) => home.join(DEFAULT_ROOT_NAME),
        (None, None) => return Err(ConfigError::HomeDirUnavailable),
    };

    let editor = cli
        .editor
        .as_deref()
        .map(str::trim)
        .filter(|editor| !editor.is_empty())
        .unwrap_or(DEFAULT_EDITOR);
    let mut config = JournalConfig::new(root).with_editor(editor);

    let template = cli.template.clone().or_else(|| {
        home.map(|home| home.join(DEFAULT_TEMPLATE_NAME))
            .filter(|path| path.is_file())
    });
    if let Some(template) = template {
        config = config.with_template(template);
    }
    Ok(config)
}

/// `--log-dir`, else `{data dir}/datebook/logs`.
pub fn resolve_log_dir(cli: &Cli) -> Option<PathBuf> {
    cli.log_dir
        .clone()
        .or_else(|| dirs::data_local_dir().map(|dir| dir.join("datebook").join("logs")))
}
