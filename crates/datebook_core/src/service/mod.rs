//! Journal use-case services.
//!
//! # Responsibility
//! - `merge_service`: the compose/decompose carry-over protocol.
//! - `entry_service`: open/print/cleanup sequencing over collaborators.
//!
//! # Invariants
//! - Services reach files only through an `EntryStore`.

pub mod entry_service;
pub mod merge_service;
