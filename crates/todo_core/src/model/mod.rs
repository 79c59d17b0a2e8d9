//! Domain model for the task tracker.
//!
//! # Responsibility
//! - Define the task record shared by storage, service and shell layers.
//!
//! # Invariants
//! - Every task is identified by a positive `TaskId` that is never reused
//!   within a collection.

pub mod task;
