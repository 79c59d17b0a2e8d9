//! Explicit runtime configuration.
//!
//! # Responsibility
//! - Carry the task file location and logging options from the caller into
//!   core, instead of relying on process-wide paths.

use crate::logging::default_log_level;
use crate::repo::task_repo::JsonTaskRepository;
use std::path::PathBuf;

/// Default task file name, resolved against the working directory.
pub const DEFAULT_DATA_FILE: &str = "tasks.json";

/// Logging options consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// One of `trace|debug|info|warn|error|off`, case-insensitive.
    pub level: String,
    /// Absolute directory for rotating log files; `None` logs to stderr.
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub data_file: PathBuf,
    pub log: LogConfig,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            log: LogConfig::default(),
        }
    }
}

impl TodoConfig {
    /// Config with a custom task file and default logging.
    pub fn with_data_file(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            ..Self::default()
        }
    }

    /// JSON repository bound to `data_file`.
    pub fn open_repository(&self) -> JsonTaskRepository {
        JsonTaskRepository::new(self.data_file.clone())
    }
}
