//! External process collaborators.
//!
//! # Responsibility
//! - Define the editor and version-control seams used by entry orchestration.
//! - Provide process-backed implementations (`$EDITOR`, `git`).
//!
//! # Invariants
//! - Every call blocks until the child process exits.
//! - Nothing here reads or writes journal content.

pub mod editor;
pub mod git;
