//! Core domain logic for the todo tracker.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{LogConfig, TodoConfig, DEFAULT_DATA_FILE};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{normalize_title, Task, TaskId, TaskValidationError};
pub use repo::task_repo::{JsonTaskRepository, StorageError, StorageResult, TaskRepository};
pub use search::fuzzy::{search_tasks, similarity_ratio, SearchQuery, TaskMatch};
pub use service::task_service::{StatusFilter, TaskService, TaskServiceError, TaskServiceResult};
