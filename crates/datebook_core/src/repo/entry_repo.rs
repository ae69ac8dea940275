//! Journal file storage contracts and filesystem implementation.
//!
//! # Responsibility
//! - Load and store section trees by path.
//! - Provide the small raw-text primitives the cleanup marker needs.
//!
//! # Invariants
//! - A missing file is reported as `Ok(None)`, never as an error.
//! - Any other read failure or malformed content is an error; callers never
//!   overwrite a file they could not read.
//! - Writes create missing parent directories.

use crate::model::section::{ParseError, SectionTree};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failure, always tagged with the path involved.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: ParseError },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the file that failed.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "malformed journal file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Storage interface for journal files.
pub trait EntryStore {
    /// Reads raw text; `None` when the file does not exist.
    fn read_text(&self, path: &Path) -> StoreResult<Option<String>>;
    /// Replaces the file content, creating parent directories.
    fn write_text(&self, path: &Path, contents: &str) -> StoreResult<()>;
    /// Creates a new file; returns `false` without writing if it already exists.
    fn create_new(&self, path: &Path, contents: &str) -> StoreResult<bool>;
    /// Removes a file; a missing file is not an error.
    fn remove(&self, path: &Path) -> StoreResult<()>;
    /// Replaces whatever is at `link` with a link to `target`.
    ///
    /// `target` is interpreted relative to the directory holding `link`.
    fn link(&self, link: &Path, target: &Path) -> StoreResult<()>;

    /// Reads and parses a section tree; `None` when the file does not exist.
    fn load_tree(&self, path: &Path) -> StoreResult<Option<SectionTree>> {
        let Some(text) = self.read_text(path)? else {
            return Ok(None);
        };
        SectionTree::parse(&text)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Serializes `tree` over the file at `path`.
    fn store_tree(&self, path: &Path, tree: &SectionTree) -> StoreResult<()> {
        self.write_text(path, &tree.serialize())
    }
}

/// Local-filesystem store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsEntryStore;

impl FsEntryStore {
    pub fn new() -> Self {
        Self
    }
}

fn ensure_parent(path: &Path) -> StoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))
        }
        _ => Ok(()),
    }
}

impl EntryStore for FsEntryStore {
    fn read_text(&self, path: &Path) -> StoreResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    fn write_text(&self, path: &Path, contents: &str) -> StoreResult<()> {
        ensure_parent(path)?;
        fs::write(path, contents).map_err(|err| StoreError::io(path, err))
    }

    fn create_new(&self, path: &Path, contents: &str) -> StoreResult<bool> {
        ensure_parent(path)?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(err) => return Err(StoreError::io(path, err)),
        };
        file.write_all(contents.as_bytes())
            .map_err(|err| StoreError::io(path, err))?;
        Ok(true)
    }

    fn remove(&self, path: &Path) -> StoreResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    #[cfg(unix)]
    fn link(&self, link: &Path, target: &Path) -> StoreResult<()> {
        self.remove(link)?;
        std::os::unix::fs::symlink(target, link).map_err(|err| StoreError::io(link, err))
    }

    // No portable symlinks; keep a plain copy instead.
    #[cfg(not(unix))]
    fn link(&self, link: &Path, target: &Path) -> StoreResult<()> {
        let source = link.parent().unwrap_or(Path::new("")).join(target);
        self.remove(link)?;
        fs::copy(&source, link)
            .map(|_| ())
            .map_err(|err| StoreError::io(link, err))
    }
}

/// In-memory store keyed by path, for callers that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    files: RefCell<BTreeMap<PathBuf, String>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

impl EntryStore for MemoryEntryStore {
    fn read_text(&self, path: &Path) -> StoreResult<Option<String>> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_text(&self, path: &Path, contents: &str) -> StoreResult<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn create_new(&self, path: &Path, contents: &str) -> StoreResult<bool> {
        let mut files = self.files.borrow_mut();
        if files.contains_key(path) {
            return Ok(false);
        }
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(true)
    }

    fn remove(&self, path: &Path) -> StoreResult<()> {
        self.files.borrow_mut().remove(path);
        Ok(())
    }

    /// Records the link target as the file content.
    fn link(&self, link: &Path, target: &Path) -> StoreResult<()> {
        self.write_text(link, &target.to_string_lossy())
    }
}
