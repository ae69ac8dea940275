//! Git persistence collaborator.
//!
//! # Invariants
//! - Commands run with the journal root as working directory.
//! - A root without `.git` is skipped, not an error.
//! - "Nothing to commit" is a successful no-op.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

const NOTHING_TO_COMMIT_MARKERS: &[&str] = &[
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
];

/// Version-control failure.
#[derive(Debug)]
pub enum VcsError {
    /// `git` could not be started.
    Spawn { command: String, source: io::Error },
    /// `git` ran and reported failure.
    CommandFailed { command: String, stderr: String },
}

impl Display for VcsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn { command, source } => write!(f, "failed to run `{command}`: {source}"),
            Self::CommandFailed { command, stderr } => {
                write!(f, "`{command}` failed: {}", stderr.trim())
            }
        }
    }
}

impl Error for VcsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::CommandFailed { .. } => None,
        }
    }
}

/// What a commit attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
    NotARepository,
}

/// Records all pending journal changes under one message.
pub trait VersionControl {
    fn commit_all(&self, message: &str) -> Result<CommitOutcome, VcsError>;
}

/// `git add --all && git commit -m {message}` inside the journal root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitVcs {
    root: PathBuf,
}

impl GitVcs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn is_repository(&self) -> bool {
        self.root.join(".git").exists()
    }

    fn run(&self, args: &[&str]) -> Result<Output, VcsError> {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| VcsError::Spawn {
                command: display_command(args),
                source,
            })
    }
}

impl VersionControl for GitVcs {
    fn commit_all(&self, message: &str) -> Result<CommitOutcome, VcsError> {
        if !self.is_repository() {
            info!(
                "event=git_commit module=process status=skipped reason=not_a_repository root={}",
                self.root.display()
            );
            return Ok(CommitOutcome::NotARepository);
        }

        let add_args = ["add", "--all"];
        let added = self.run(&add_args)?;
        if !added.status.success() {
            return Err(command_failed(&add_args, &added));
        }

        let commit_args = ["commit", "-m", message];
        let committed = self.run(&commit_args)?;
        if committed.status.success() {
            info!("event=git_commit module=process status=ok");
            return Ok(CommitOutcome::Committed);
        }
        if is_nothing_to_commit(&committed) {
            info!("event=git_commit module=process status=skipped reason=no_changes");
            return Ok(CommitOutcome::NothingToCommit);
        }
        Err(command_failed(&commit_args, &committed))
    }
}

fn is_nothing_to_commit(output: &Output) -> bool {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    NOTHING_TO_COMMIT_MARKERS
        .iter()
        .any(|marker| stdout.contains(marker) || stderr.contains(marker))
}

fn command_failed(args: &[&str], output: &Output) -> VcsError {
    let command = display_command(args);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    error!(
        "event=git_commit module=process status=error command=\"{command}\" exit_code={:?}",
        output.status.code()
    );
    VcsError::CommandFailed { command, stderr }
}

fn display_command(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}
