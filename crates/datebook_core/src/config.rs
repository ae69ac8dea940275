//! Journal configuration value.
//!
//! # Responsibility
//! - Carry the journal root, template location and editor command.
//! - Bootstrap the root directory before any entry is touched.
//!
//! # Invariants
//! - Configuration is an explicit value handed to constructors; core keeps no
//!   process-wide config state.
//! - `root` must be a directory once `ensure_root()` succeeds.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Editor used when none is configured.
pub const DEFAULT_EDITOR: &str = "vi";

/// Configuration failure.
#[derive(Debug)]
pub enum ConfigError {
    /// Root path is empty.
    MissingRoot,
    /// Root path exists but is not a directory.
    RootNotDirectory(PathBuf),
    /// Root directory could not be created.
    RootCreate { path: PathBuf, source: io::Error },
    /// Configured template file could not be read.
    TemplateUnreadable { path: PathBuf, source: io::Error },
    /// Configured template file is not valid section markdown.
    TemplateInvalid { path: PathBuf, details: String },
    /// Home directory lookup failed while resolving defaults.
    HomeDirUnavailable,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRoot => write!(f, "journal directory is not configured"),
            Self::RootNotDirectory(path) => {
                write!(f, "journal directory `{}` is not a directory", path.display())
            }
            Self::RootCreate { path, source } => write!(
                f,
                "unable to create journal directory `{}`: {source}",
                path.display()
            ),
            Self::TemplateUnreadable { path, source } => {
                write!(f, "unable to read template `{}`: {source}", path.display())
            }
            Self::TemplateInvalid { path, details } => {
                write!(f, "invalid template `{}`: {details}", path.display())
            }
            Self::HomeDirUnavailable => write!(f, "unable to determine home directory"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RootCreate { source, .. } => Some(source),
            Self::TemplateUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Settings shared by path resolution, merging and entry orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    /// Journal root directory.
    pub root: PathBuf,
    /// Template for new day entries. `None` uses the built-in template.
    pub template: Option<PathBuf>,
    /// Editor command line, e.g. `vim` or `code --wait`.
    pub editor: String,
}

impl JournalConfig {
    /// Creates a config rooted at `root` with built-in template and `vi`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            template: None,
            editor: DEFAULT_EDITOR.to_string(),
        }
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root directory when it does not exist yet.
    ///
    /// # Errors
    /// - `MissingRoot` for an empty path.
    /// - `RootNotDirectory` when the path names a regular file.
    /// - `RootCreate` when directory creation fails.
    pub fn ensure_root(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::MissingRoot);
        }
        if self.root.is_dir() {
            return Ok(());
        }
        if self.root.exists() {
            return Err(ConfigError::RootNotDirectory(self.root.clone()));
        }

        std::fs::create_dir_all(&self.root).map_err(|source| ConfigError::RootCreate {
            path: self.root.clone(),
            source,
        })?;
        info!(
            "event=root_bootstrap module=config status=ok root={}",
            self.root.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, JournalConfig, DEFAULT_EDITOR};

    #[test]
    fn new_uses_defaults() {
        let config = JournalConfig::new("/tmp/journal");
        assert_eq!(config.editor, DEFAULT_EDITOR);
        assert!(config.template.is_none());
    }

    #[test]
    fn ensure_root_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a").join("journal");
        let config = JournalConfig::new(&root);

        config.ensure_root().unwrap();
        assert!(root.is_dir());
        config.ensure_root().expect("existing root should be accepted");
    }

    #[test]
    fn ensure_root_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("journal");
        std::fs::write(&file, "not a dir").unwrap();

        let err = JournalConfig::new(&file).ensure_root().unwrap_err();
        assert!(matches!(err, ConfigError::RootNotDirectory(_)));
    }

    #[test]
    fn ensure_root_rejects_empty_path() {
        let err = JournalConfig::new("").ensure_root().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot));
    }
}
