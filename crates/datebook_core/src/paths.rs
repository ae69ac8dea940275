//! Date to journal-file naming.
//!
//! # Responsibility
//! - Map a calendar date to its day, week and longterm file identities.
//!
//! # Invariants
//! - Pure functions of `(root, date)`; nothing here touches the filesystem.
//! - Weeks start on Sunday; every date of one week maps to the same week file.
//! - File and directory names are lowercase.

use chrono::{Datelike, Days, NaiveDate};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Longterm file name at the journal root.
pub const LONGTERM_FILE_NAME: &str = "longterm.md";
/// Marker left behind by a deferred `print`.
pub const CLEANUP_MARKER_NAME: &str = ".cleanup";
/// Link refreshed to point at today's entry.
pub const README_NAME: &str = "README.md";

/// Half-open `[start, end)` range of the Sunday-based week holding `date`.
pub fn week_bounds(date: NaiveDate) -> Range<NaiveDate> {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    let start = date - Days::new(offset);
    let end = date + Days::new(7 - offset);
    start..end
}

/// Resolves journal file paths under one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{year}/{month#}_{month}` for `date`.
    pub fn month_directory(&self, date: NaiveDate) -> PathBuf {
        let month_dir = date.format("%-m_%B").to_string().to_lowercase();
        self.root.join(date.year().to_string()).join(month_dir)
    }

    /// `{month dir}/{weekday}_{month}_{day}_{year}.md`.
    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        let file_name = format!("{}_{}.md", date.format("%A_%B_%-d"), date.year());
        self.month_directory(date).join(file_name.to_lowercase())
    }

    /// `{week-start month dir}/week_{month}_{day}.md`, keyed by the week start.
    pub fn week_path(&self, date: NaiveDate) -> PathBuf {
        let start = week_bounds(date).start;
        let file_name = start.format("week_%B_%-d.md").to_string().to_lowercase();
        self.month_directory(start).join(file_name)
    }

    pub fn longterm_path(&self) -> PathBuf {
        self.root.join(LONGTERM_FILE_NAME)
    }

    pub fn cleanup_marker_path(&self) -> PathBuf {
        self.root.join(CLEANUP_MARKER_NAME)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.root.join(README_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::{week_bounds, PathResolver};
    use chrono::{Datelike, Days, NaiveDate};
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_path_is_lowercase_and_unpadded() {
        let resolver = PathResolver::new("/journal");
        assert_eq!(
            resolver.day_path(date(2024, 3, 5)),
            PathBuf::from("/journal/2024/3_march/tuesday_march_5_2024.md")
        );
    }

    #[test]
    fn week_path_is_stable_across_the_week() {
        let resolver = PathResolver::new("/journal");
        let sunday = date(2024, 3, 10);
        let expected = PathBuf::from("/journal/2024/3_march/week_march_10.md");
        for offset in 0..7 {
            let day = sunday + Days::new(offset);
            assert_eq!(resolver.week_path(day), expected, "day {day}");
        }
        assert_ne!(resolver.week_path(date(2024, 3, 17)), expected);
    }

    #[test]
    fn week_spanning_months_uses_start_month_directory() {
        let resolver = PathResolver::new("/journal");
        assert_eq!(
            resolver.week_path(date(2024, 1, 2)),
            PathBuf::from("/journal/2023/12_december/week_december_31.md")
        );
    }

    #[test]
    fn week_bounds_cover_seven_days_from_sunday() {
        let bounds = week_bounds(date(2024, 3, 15));
        assert_eq!(bounds.start, date(2024, 3, 10));
        assert_eq!(bounds.end, date(2024, 3, 17));
        assert_eq!(bounds.start.weekday(), chrono::Weekday::Sun);
    }

    #[test]
    fn two_digit_month_keeps_full_name() {
        let resolver = PathResolver::new("/journal");
        assert_eq!(
            resolver.day_path(date(2024, 12, 1)),
            PathBuf::from("/journal/2024/12_december/sunday_december_1_2024.md")
        );
    }

    #[test]
    fn root_level_files() {
        let resolver = PathResolver::new("/journal");
        assert_eq!(resolver.longterm_path(), PathBuf::from("/journal/longterm.md"));
        assert_eq!(resolver.cleanup_marker_path(), PathBuf::from("/journal/.cleanup"));
        assert_eq!(resolver.readme_path(), PathBuf::from("/journal/README.md"));
    }
}
