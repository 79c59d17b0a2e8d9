//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the whole-collection persistence contract used by services.
//! - Isolate file format details from business orchestration.
//!
//! # Invariants
//! - Repositories report storage failures as `StorageError`, never as
//!   validation or not-found errors.

pub mod task_repo;
