//! Carry-over merge protocol between day, week and longterm files.
//!
//! # Responsibility
//! - Compose a day view: day sections plus the current `## week` and
//!   `## longterm` sections.
//! - Decompose an edited day view back into the week/longterm files.
//! - Instantiate the day template for entries that have no content yet.
//!
//! # Invariants
//! - Composing twice without a decompose in between yields identical files;
//!   stale carried sections are popped before the fresh ones are appended.
//! - Carried sections are appended week first, then longterm.
//! - Extracted carry bodies lose leading/trailing blank lines; composed ones
//!   end with exactly one blank separator line.
//! - Decompose overwrites both satellite files and never rewrites the day file.

use crate::config::{ConfigError, JournalConfig};
use crate::model::section::{Section, SectionTree};
use crate::paths::PathResolver;
use crate::repo::entry_repo::{EntryStore, StoreError};
use chrono::{Datelike, NaiveDate};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Section name carried across the days of one week.
pub const WEEK_SECTION: &str = "week";
/// Section name carried across all days.
pub const LONGTERM_SECTION: &str = "longterm";
/// Heading level of carried sections.
pub const CARRY_LEVEL: u8 = 2;
/// Heading of the built-in day template.
pub const DEFAULT_TEMPLATE_HEADER: &str = "{{weekday}}, {{month}} {{day}}, {{year}}";

/// Merge-layer failure.
#[derive(Debug)]
pub enum MergeError {
    /// Reading or writing a journal file failed.
    Store(StoreError),
    /// Template configuration is unusable.
    Config(ConfigError),
    /// Decompose was asked to split a day file that does not exist.
    MissingDayFile(PathBuf),
}

impl Display for MergeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::MissingDayFile(path) => {
                write!(f, "day entry `{}` does not exist", path.display())
            }
        }
    }
}

impl Error for MergeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::MissingDayFile(_) => None,
        }
    }
}

impl From<StoreError> for MergeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ConfigError> for MergeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Where a carried section came from during compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrySource {
    /// Loaded from its own file.
    File,
    /// File missing or empty; a blank section was created.
    Synthesized,
}

/// Result of composing a day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOutcome {
    pub day_path: PathBuf,
    /// `true` when the day tree came from the template.
    pub templated: bool,
    pub week: CarrySource,
    pub longterm: CarrySource,
    /// Level-2 sections appended to the day tree.
    pub carried_sections: usize,
}

/// Result of splitting a day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposeOutcome {
    pub week_path: PathBuf,
    pub longterm_path: PathBuf,
    /// `false` means the week file was truncated to empty.
    pub week_found: bool,
    /// `false` means the longterm file was truncated to empty.
    pub longterm_found: bool,
}

/// Replaces `{{year}}`, `{{month}}`, `{{weekday}}` and `{{day}}` in `text`.
pub fn render_placeholders(text: &str, date: NaiveDate) -> String {
    text.replace("{{year}}", &date.year().to_string())
        .replace("{{month}}", &date.format("%B").to_string())
        .replace("{{weekday}}", &date.format("%A").to_string())
        .replace("{{day}}", &date.day().to_string())
}

/// Compose/decompose service over an entry store.
pub struct MergeService<S: EntryStore> {
    store: S,
    paths: PathResolver,
    template: Option<PathBuf>,
}

impl<S: EntryStore> MergeService<S> {
    /// Creates a service for the journal described by `config`.
    pub fn new(store: S, config: &JournalConfig) -> Self {
        Self {
            store,
            paths: PathResolver::new(config.root.clone()),
            template: config.template.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Builds the initial day tree for `date` from the configured template.
    ///
    /// Only section names are rendered; body lines are copied verbatim.
    ///
    /// # Errors
    /// - `ConfigError::TemplateUnreadable` when the template file is missing.
    /// - `ConfigError::TemplateInvalid` when it has body text before a header.
    pub fn apply_template(&self, date: NaiveDate) -> Result<SectionTree, MergeError> {
        let mut tree = match self.template.as_deref() {
            Some(path) => self.load_template(path)?,
            None => [Section::new(1, DEFAULT_TEMPLATE_HEADER)]
                .into_iter()
                .collect(),
        };

        for section in tree.iter_mut() {
            section.name = render_placeholders(&section.name, date);
        }
        info!(
            "event=template_apply module=merge status=ok source={} sections={}",
            if self.template.is_some() { "file" } else { "builtin" },
            tree.len()
        );
        Ok(tree)
    }

    /// Writes the composed day view for `date` and returns its status.
    ///
    /// # Errors
    /// - Any read failure other than "not found", malformed journal files and
    ///   template problems abort before the day file is written.
    pub fn prepare_day_view(&self, date: NaiveDate) -> Result<ComposeOutcome, MergeError> {
        let started_at = Instant::now();
        info!("event=day_view_prepare module=merge status=start date={date}");

        let result = self.compose(date);
        match &result {
            Ok(outcome) => info!(
                "event=day_view_prepare module=merge status=ok date={date} templated={} week={:?} longterm={:?} carried={} duration_ms={}",
                outcome.templated,
                outcome.week,
                outcome.longterm,
                outcome.carried_sections,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=day_view_prepare module=merge status=error date={date} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    /// Splits the edited day view for `date` into its week/longterm files.
    ///
    /// # Errors
    /// - `MissingDayFile` when the day entry was never composed.
    /// - Store errors for unreadable/malformed day files or failed writes.
    pub fn save_day_view(&self, date: NaiveDate) -> Result<DecomposeOutcome, MergeError> {
        let started_at = Instant::now();
        let result = self.decompose(date);
        match &result {
            Ok(outcome) => info!(
                "event=day_view_save module=merge status=ok date={date} week_found={} longterm_found={} duration_ms={}",
                outcome.week_found,
                outcome.longterm_found,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=day_view_save module=merge status=error date={date} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn compose(&self, date: NaiveDate) -> Result<ComposeOutcome, MergeError> {
        let day_path = self.paths.day_path(date);
        let (mut day_tree, templated) = match self.store.load_tree(&day_path)? {
            Some(tree) if !tree.is_empty() => (tree, false),
            _ => (self.apply_template(date)?, true),
        };

        day_tree.pop(LONGTERM_SECTION, CARRY_LEVEL);
        day_tree.pop(WEEK_SECTION, CARRY_LEVEL);

        let (longterm_tree, longterm) =
            self.load_carry_tree(&self.paths.longterm_path(), LONGTERM_SECTION)?;
        let (week_tree, week) = self.load_carry_tree(&self.paths.week_path(date), WEEK_SECTION)?;

        let mut carried_sections = 0;
        for tree in [&week_tree, &longterm_tree] {
            tree.walk(|section| {
                if section.level == CARRY_LEVEL {
                    day_tree.push(section.with_trailing_separator());
                    carried_sections += 1;
                }
                ControlFlow::Continue(())
            });
        }

        self.store.store_tree(&day_path, &day_tree)?;
        Ok(ComposeOutcome {
            day_path,
            templated,
            week,
            longterm,
            carried_sections,
        })
    }

    fn decompose(&self, date: NaiveDate) -> Result<DecomposeOutcome, MergeError> {
        let day_path = self.paths.day_path(date);
        let day_tree = self
            .store
            .load_tree(&day_path)?
            .ok_or(MergeError::MissingDayFile(day_path))?;

        let longterm_path = self.paths.longterm_path();
        let longterm_found = self.extract_carry(&day_tree, LONGTERM_SECTION, &longterm_path)?;
        let week_path = self.paths.week_path(date);
        let week_found = self.extract_carry(&day_tree, WEEK_SECTION, &week_path)?;

        Ok(DecomposeOutcome {
            week_path,
            longterm_path,
            week_found,
            longterm_found,
        })
    }

    fn load_carry_tree(
        &self,
        path: &Path,
        name: &str,
    ) -> Result<(SectionTree, CarrySource), MergeError> {
        match self.store.load_tree(path)? {
            Some(tree) if !tree.is_empty() => Ok((tree, CarrySource::File)),
            _ => Ok((
                [Section::blank(CARRY_LEVEL, name)].into_iter().collect(),
                CarrySource::Synthesized,
            )),
        }
    }

    fn extract_carry(
        &self,
        day_tree: &SectionTree,
        name: &str,
        path: &Path,
    ) -> Result<bool, MergeError> {
        let section = day_tree.find(name, CARRY_LEVEL).map(|section| {
            let mut section = section.clone();
            section.trim_blank_lines();
            section
        });
        let found = section.is_some();
        let tree: SectionTree = section.into_iter().collect();
        self.store.store_tree(path, &tree)?;
        Ok(found)
    }

    fn load_template(&self, path: &Path) -> Result<SectionTree, MergeError> {
        let text = match self.store.read_text(path) {
            Ok(Some(text)) => text,
            Ok(None) => {
                return Err(ConfigError::TemplateUnreadable {
                    path: path.to_path_buf(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                }
                .into())
            }
            Err(StoreError::Io { source, .. }) => {
                return Err(ConfigError::TemplateUnreadable {
                    path: path.to_path_buf(),
                    source,
                }
                .into())
            }
            Err(other) => return Err(other.into()),
        };

        SectionTree::parse(&text).map_err(|err| {
            ConfigError::TemplateInvalid {
                path: path.to_path_buf(),
                details: err.to_string(),
            }
            .into()
        })
    }
}
