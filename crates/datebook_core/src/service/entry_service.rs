//! Entry use-case orchestration: open, print and cleanup.
//!
//! # Responsibility
//! - Sequence compose, edit, decompose and commit for one date.
//! - Own the `.cleanup` marker protocol that lets `print` defer its save.
//!
//! # Invariants
//! - A failed editor run skips decompose and commit; the day file stays
//!   composed and the next compose discards the stale carried sections.
//! - `print` never touches an entry file while a `.cleanup` marker exists.
//! - The marker is removed by `cleanup` whatever the outcome of the save.

use crate::process::editor::{Editor, EditorError};
use crate::process::git::{CommitOutcome, VcsError, VersionControl};
use crate::repo::entry_repo::{EntryStore, StoreError};
use crate::service::merge_service::{ComposeOutcome, DecomposeOutcome, MergeError, MergeService};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Entry-level failure.
#[derive(Debug)]
pub enum EntryError {
    Merge(MergeError),
    Store(StoreError),
    /// A deferred `print` has not been cleaned up yet.
    CleanupPending { timestamp: String },
    /// The `.cleanup` marker does not hold a Unix timestamp.
    CorruptCleanupMarker { contents: String },
    Editor(EditorError),
    Vcs(VcsError),
}

impl Display for EntryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::CleanupPending { timestamp } => write!(
                f,
                "a previous print (timestamp {timestamp}) was never cleaned up; run the cleanup action and try again"
            ),
            Self::CorruptCleanupMarker { contents } => {
                write!(f, "cleanup marker is corrupted: `{contents}`")
            }
            Self::Editor(err) => write!(f, "{err}"),
            Self::Vcs(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Merge(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Editor(err) => Some(err),
            Self::Vcs(err) => Some(err),
            Self::CleanupPending { .. } | Self::CorruptCleanupMarker { .. } => None,
        }
    }
}

impl From<MergeError> for EntryError {
    fn from(value: MergeError) -> Self {
        Self::Merge(value)
    }
}

impl From<StoreError> for EntryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<EditorError> for EntryError {
    fn from(value: EditorError) -> Self {
        Self::Editor(value)
    }
}

impl From<VcsError> for EntryError {
    fn from(value: VcsError) -> Self {
        Self::Vcs(value)
    }
}

/// Result of a completed `open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOutcome {
    /// Date finished on behalf of an earlier `print`, if any.
    pub cleaned_up: Option<NaiveDate>,
    pub compose: ComposeOutcome,
    pub decompose: DecomposeOutcome,
    pub readme_refreshed: bool,
    pub commit: CommitOutcome,
}

/// Result of a completed `cleanup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub date: NaiveDate,
    pub decompose: DecomposeOutcome,
    pub commit: CommitOutcome,
}

/// Commit message for an entry date, e.g. `Friday March 2024`.
pub fn commit_message(date: NaiveDate) -> String {
    format!("{} {}", date.format("%A %B"), date.year())
}

/// Unix timestamp written to the cleanup marker (midnight UTC of `date`).
pub fn marker_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::default()).and_utc().timestamp()
}

fn parse_marker(contents: &str) -> Option<NaiveDate> {
    let epoch: i64 = contents.trim().parse().ok()?;
    DateTime::from_timestamp(epoch, 0).map(|moment| moment.date_naive())
}

/// Entry service over merge, editor and version-control collaborators.
pub struct EntryService<S: EntryStore, E: Editor, V: VersionControl> {
    merge: MergeService<S>,
    editor: E,
    vcs: V,
    today: NaiveDate,
}

impl<S: EntryStore, E: Editor, V: VersionControl> EntryService<S, E, V> {
    /// Creates a service whose notion of "today" is the local date.
    pub fn new(merge: MergeService<S>, editor: E, vcs: V) -> Self {
        Self {
            merge,
            editor,
            vcs,
            today: Local::now().date_naive(),
        }
    }

    /// Overrides the date treated as today (README link refresh).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn merge(&self) -> &MergeService<S> {
        &self.merge
    }

    /// Composes, edits, decomposes and commits the entry for `date`.
    ///
    /// A pending `.cleanup` marker is finished first.
    ///
    /// # Errors
    /// - Editor failure aborts before decompose/commit.
    /// - Merge, store and git failures abort the remaining steps.
    pub fn open(&self, date: NaiveDate) -> Result<OpenOutcome, EntryError> {
        let cleaned_up = self.cleanup()?.map(|outcome| outcome.date);

        let compose = self.merge.prepare_day_view(date)?;
        self.editor.edit(&compose.day_path)?;
        let decompose = self.merge.save_day_view(date)?;

        let readme_refreshed = date == self.today;
        if readme_refreshed {
            self.refresh_readme(date)?;
        }

        let commit = self.vcs.commit_all(&commit_message(date))?;
        info!("event=entry_open module=entry status=ok date={date} commit={commit:?}");
        Ok(OpenOutcome {
            cleaned_up,
            compose,
            decompose,
            readme_refreshed,
            commit,
        })
    }

    /// Composes the entry for `date` and defers its save to `cleanup`.
    ///
    /// Returns the day file path for the caller to hand to another tool.
    ///
    /// # Errors
    /// - `CleanupPending` when a `.cleanup` marker already exists; no entry
    ///   file is touched in that case.
    pub fn print(&self, date: NaiveDate) -> Result<PathBuf, EntryError> {
        let store = self.merge.store();
        let marker = self.merge.paths().cleanup_marker_path();
        if let Some(pending) = store.read_text(&marker)? {
            warn!("event=entry_print module=entry status=blocked reason=cleanup_pending");
            return Err(EntryError::CleanupPending {
                timestamp: pending.trim().to_string(),
            });
        }

        let compose = self.merge.prepare_day_view(date)?;
        let timestamp = marker_timestamp(date).to_string();
        if !store.create_new(&marker, &timestamp)? {
            return Err(EntryError::CleanupPending { timestamp });
        }
        info!("event=entry_print module=entry status=ok date={date}");
        Ok(compose.day_path)
    }

    /// Finishes a deferred `print`: decompose and commit its date.
    ///
    /// Returns `Ok(None)` when no marker exists.
    ///
    /// # Errors
    /// - `CorruptCleanupMarker` when the marker is not a Unix timestamp.
    pub fn cleanup(&self) -> Result<Option<CleanupOutcome>, EntryError> {
        let store = self.merge.store();
        let marker = self.merge.paths().cleanup_marker_path();
        let Some(contents) = store.read_text(&marker)? else {
            return Ok(None);
        };
        store.remove(&marker)?;

        let date = parse_marker(&contents).ok_or_else(|| EntryError::CorruptCleanupMarker {
            contents: contents.trim().to_string(),
        })?;
        let decompose = self.merge.save_day_view(date)?;
        let commit = self.vcs.commit_all(&commit_message(date))?;
        info!("event=entry_cleanup module=entry status=ok date={date} commit={commit:?}");
        Ok(Some(CleanupOutcome {
            date,
            decompose,
            commit,
        }))
    }

    fn refresh_readme(&self, date: NaiveDate) -> Result<(), EntryError> {
        let paths = self.merge.paths();
        let day_path = paths.day_path(date);
        let target = day_path
            .strip_prefix(paths.root())
            .unwrap_or(day_path.as_path());
        self.merge.store().link(&paths.readme_path(), target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{commit_message, marker_timestamp, parse_marker};
    use chrono::NaiveDate;

    #[test]
    fn commit_message_uses_full_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(commit_message(date), "Friday March 2024");
    }

    #[test]
    fn marker_round_trips_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(marker_timestamp(date), 1_710_460_800);
        assert_eq!(parse_marker(" 1710460800\n"), Some(date));
        assert_eq!(parse_marker("yesterday"), None);
    }
}
