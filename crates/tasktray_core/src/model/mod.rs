//! Domain model for the task list.
//!
//! # Invariants
//! - Every task carries a stable `TaskId` in addition to its list position.
//! - Deletion removes the record; there are no tombstones.

pub mod task;
