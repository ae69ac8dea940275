//! Storage abstractions and implementations for journal files.
//!
//! # Responsibility
//! - Define the file access contract used by merge/entry services.
//! - Keep `std::fs` details out of the merge protocol.
//!
//! # Invariants
//! - "File does not exist" is a value (`None`), not an error.

pub mod entry_repo;
