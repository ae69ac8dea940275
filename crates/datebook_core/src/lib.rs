//! Core domain logic for Datebook.
//! This crate owns the section document model and the day/week/longterm
//! carry-over protocol; the CLI only wires configuration and collaborators.

pub mod config;
pub mod dateparse;
pub mod logging;
pub mod model;
pub mod paths;
pub mod process;
pub mod repo;
pub mod service;

pub use config::{ConfigError, JournalConfig};
pub use dateparse::{parse_date, parse_date_words, DateParseError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::section::{ParseError, Section, SectionTree};
pub use paths::{week_bounds, PathResolver};
pub use process::editor::{Editor, EditorError, ProcessEditor};
pub use process::git::{CommitOutcome, GitVcs, VcsError, VersionControl};
pub use repo::entry_repo::{EntryStore, FsEntryStore, MemoryEntryStore, StoreError, StoreResult};
pub use service::entry_service::{
    commit_message, CleanupOutcome, EntryError, EntryService, OpenOutcome,
};
pub use service::merge_service::{
    CarrySource, ComposeOutcome, DecomposeOutcome, MergeError, MergeService, LONGTERM_SECTION,
    WEEK_SECTION,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builds the filesystem-backed entry service for `config`.
pub fn journal_service(config: &JournalConfig) -> EntryService<FsEntryStore, ProcessEditor, GitVcs> {
    EntryService::new(
        MergeService::new(FsEntryStore::new(), config),
        ProcessEditor::new(config.editor.clone()),
        GitVcs::new(config.root.clone()),
    )
}
