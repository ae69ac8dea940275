use chrono::NaiveDate;
use datebook_core::{
    CommitOutcome, Editor, EditorError, EntryError, EntryService, FsEntryStore, JournalConfig,
    MergeService, VcsError, VersionControl,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Rewrites the day file the way a user would, or fails like a crashed editor.
struct ScriptedEditor {
    replace: Option<(&'static str, &'static str)>,
    fail: bool,
    opened: Rc<RefCell<Vec<PathBuf>>>,
}

impl Editor for ScriptedEditor {
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        self.opened.borrow_mut().push(path.to_path_buf());
        if self.fail {
            return Err(EditorError::ExitStatus(Some(1)));
        }
        if let Some((from, to)) = self.replace {
            let text = fs::read_to_string(path).unwrap();
            fs::write(path, text.replace(from, to)).unwrap();
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingVcs {
    messages: Rc<RefCell<Vec<String>>>,
}

impl VersionControl for RecordingVcs {
    fn commit_all(&self, message: &str) -> Result<CommitOutcome, VcsError> {
        self.messages.borrow_mut().push(message.to_string());
        Ok(CommitOutcome::Committed)
    }
}

struct Harness {
    dir: TempDir,
    opened: Rc<RefCell<Vec<PathBuf>>>,
    commits: Rc<RefCell<Vec<String>>>,
    service: EntryService<FsEntryStore, ScriptedEditor, RecordingVcs>,
}

impl Harness {
    fn new(replace: Option<(&'static str, &'static str)>, fail: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let opened = Rc::new(RefCell::new(Vec::new()));
        let vcs = RecordingVcs::default();
        let commits = Rc::clone(&vcs.messages);
        let editor = ScriptedEditor {
            replace,
            fail,
            opened: Rc::clone(&opened),
        };
        let merge = MergeService::new(FsEntryStore::new(), &JournalConfig::new(dir.path()));
        let service = EntryService::new(merge, editor, vcs).with_today(friday());
        Self {
            dir,
            opened,
            commits,
            service,
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn marker(&self) -> PathBuf {
        self.root().join(".cleanup")
    }

    fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }
}

fn friday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn thursday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

const WEEK_EDIT: (&str, &str) = ("## week\n\n", "## week\nship it\n");

#[test]
fn open_composes_edits_splits_and_commits() {
    let harness = Harness::new(Some(WEEK_EDIT), false);

    let outcome = harness.service.open(friday()).unwrap();

    assert_eq!(outcome.cleaned_up, None);
    assert_eq!(
        harness.opened.borrow().as_slice(),
        &[outcome.compose.day_path.clone()]
    );
    assert_eq!(
        fs::read_to_string(&outcome.decompose.week_path).unwrap(),
        "## week\nship it\n"
    );
    assert_eq!(
        fs::read_to_string(&outcome.decompose.longterm_path).unwrap(),
        "## longterm\n"
    );
    assert_eq!(outcome.commit, CommitOutcome::Committed);
    assert_eq!(harness.commits(), vec!["Friday March 2024"]);
}

#[cfg(unix)]
#[test]
fn open_for_today_points_readme_at_the_entry() {
    let harness = Harness::new(None, false);

    let outcome = harness.service.open(friday()).unwrap();

    assert!(outcome.readme_refreshed);
    let readme = harness.root().join("README.md");
    assert_eq!(
        fs::read_link(&readme).unwrap(),
        Path::new("2024/3_march/friday_march_15_2024.md")
    );
}

#[test]
fn open_for_another_day_leaves_readme_alone() {
    let harness = Harness::new(None, false);

    let outcome = harness.service.open(thursday()).unwrap();

    assert!(!outcome.readme_refreshed);
    assert!(!harness.root().join("README.md").exists());
    assert_eq!(harness.commits(), vec!["Thursday March 2024"]);
}

#[test]
fn editor_failure_skips_split_and_commit() {
    let harness = Harness::new(None, true);

    let err = harness.service.open(friday()).unwrap_err();

    assert!(matches!(err, EntryError::Editor(EditorError::ExitStatus(Some(1)))));
    let paths = harness.service.merge().paths();
    assert!(paths.day_path(friday()).exists());
    assert!(!paths.week_path(friday()).exists());
    assert!(!paths.longterm_path().exists());
    assert!(harness.commits().is_empty());
}

#[test]
fn print_defers_save_until_cleanup() {
    let harness = Harness::new(None, false);

    let day_path = harness.service.print(friday()).unwrap();
    assert!(harness.opened.borrow().is_empty());
    assert_eq!(fs::read_to_string(harness.marker()).unwrap(), "1710460800");
    assert!(harness.commits().is_empty());

    let text = fs::read_to_string(&day_path).unwrap();
    fs::write(&day_path, text.replace("## week\n\n", "## week\nfrom print\n")).unwrap();

    let outcome = harness.service.cleanup().unwrap().unwrap();
    assert_eq!(outcome.date, friday());
    assert!(!harness.marker().exists());
    assert_eq!(
        fs::read_to_string(&outcome.decompose.week_path).unwrap(),
        "## week\nfrom print\n"
    );
    assert_eq!(harness.commits(), vec!["Friday March 2024"]);
}

#[test]
fn print_refuses_while_cleanup_is_pending() {
    let harness = Harness::new(None, false);
    fs::write(harness.marker(), "12345").unwrap();

    let err = harness.service.print(friday()).unwrap_err();

    match err {
        EntryError::CleanupPending { timestamp } => assert_eq!(timestamp, "12345"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!harness.service.merge().paths().day_path(friday()).exists());
    assert_eq!(fs::read_to_string(harness.marker()).unwrap(), "12345");
}

#[test]
fn open_finishes_pending_cleanup_first() {
    let harness = Harness::new(None, false);
    harness.service.print(thursday()).unwrap();

    let outcome = harness.service.open(friday()).unwrap();

    assert_eq!(outcome.cleaned_up, Some(thursday()));
    assert!(!harness.marker().exists());
    assert_eq!(
        harness.commits(),
        vec!["Thursday March 2024", "Friday March 2024"]
    );
}

#[test]
fn cleanup_without_marker_does_nothing() {
    let harness = Harness::new(None, false);

    assert!(harness.service.cleanup().unwrap().is_none());
    assert!(harness.commits().is_empty());
}

#[test]
fn corrupt_marker_is_reported_and_removed() {
    let harness = Harness::new(None, false);
    fs::write(harness.marker(), "garbage\n").unwrap();

    let err = harness.service.cleanup().unwrap_err();

    match err {
        EntryError::CorruptCleanupMarker { contents } => assert_eq!(contents, "garbage"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!harness.marker().exists());
}
