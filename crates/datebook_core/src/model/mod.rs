//! Journal document model.
//!
//! # Responsibility
//! - Define the section/tree shapes every journal file is read into.
//! - Keep parsing and serialization free of filesystem access.
//!
//! # Invariants
//! - Only heading levels 1 and 2 are structural.
//! - Trees own their sections; sections have no identity outside a tree.

pub mod section;
