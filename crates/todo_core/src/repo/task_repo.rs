//! Task repository contract and JSON file implementation.
//!
//! # Responsibility
//! - Load and save the full task collection as one JSON array.
//! - Decode each persisted record defensively, skipping incomplete ones.
//!
//! # Invariants
//! - `save` never leaves the backing file half-written: content goes to a
//!   sibling `.tmp` file first and is renamed over the target.
//! - `load` either returns every well-formed record or fails; it never
//!   returns partial data for a corrupt file.
//! - Loaded collections never contain duplicate ids.

use crate::model::task::{Task, TaskId};
use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const TMP_SUFFIX: &str = "tmp";
const EMPTY_COLLECTION: &str = "[]";

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage failure with the backing file path attached.
#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Top-level value is not an array.
    InvalidFormat {
        path: PathBuf,
        found: &'static str,
    },
    /// A present field holds a value that cannot be coerced.
    InvalidData {
        path: PathBuf,
        message: String,
    },
}

impl StorageError {
    /// File the failing operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Json { path, .. }
            | Self::InvalidFormat { path, .. }
            | Self::InvalidData { path, .. } => path,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Json { .. } => "json",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::InvalidData { .. } => "invalid_data",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot access task file `{}`: {source}", path.display())
            }
            Self::Json { path, source } => write!(
                f,
                "task file `{}` is corrupted or not valid JSON: {source}",
                path.display()
            ),
            Self::InvalidFormat { path, found } => write!(
                f,
                "task file `{}` has an invalid format: expected a list, found {found}",
                path.display()
            ),
            Self::InvalidData { path, message } => {
                write!(f, "task file `{}` has invalid data: {message}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidFormat { .. } | Self::InvalidData { .. } => None,
        }
    }
}

/// Whole-collection persistence for tasks.
pub trait TaskRepository {
    fn load(&self) -> StorageResult<Vec<Task>>;
    fn save(&self, tasks: &[Task]) -> StorageResult<()>;
}

/// Task repository backed by a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonTaskRepository {
    path: PathBuf,
}

impl JsonTaskRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used for write-then-rename.
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(TMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn create_empty(&self) -> StorageResult<()> {
        fs::write(&self.path, EMPTY_COLLECTION).map_err(|err| self.io_error(err))?;
        info!(
            "event=store_init module=repo status=ok path={}",
            self.path.display()
        );
        Ok(())
    }

    fn read_tasks(&self) -> StorageResult<Vec<Task>> {
        if !self.path.exists() {
            self.create_empty()?;
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(raw).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(StorageError::InvalidFormat {
                    path: self.path.clone(),
                    found: json_kind(&other),
                });
            }
        };

        let mut tasks = Vec::with_capacity(items.len());
        let mut seen = HashSet::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(task) = self.decode_record(index, item)? else {
                continue;
            };
            if !seen.insert(task.id) {
                return Err(self.invalid_data(format!("duplicate task id {}", task.id)));
            }
            tasks.push(task);
        }
        Ok(tasks)
    }

    fn decode_record(&self, index: usize, item: &Value) -> StorageResult<Option<Task>> {
        let Some(record) = item.as_object() else {
            warn!("event=store_load module=repo status=skip index={index} reason=not_object");
            return Ok(None);
        };
        let (Some(id), Some(title)) = (record.get("id"), record.get("title")) else {
            warn!("event=store_load module=repo status=skip index={index} reason=missing_field");
            return Ok(None);
        };

        Ok(Some(Task {
            id: self.decode_id(index, id)?,
            title: self.decode_title(index, title)?,
            done: self.decode_done(index, record)?,
            created_at: self.decode_created_at(index, record)?,
        }))
    }

    fn decode_id(&self, index: usize, value: &Value) -> StorageResult<TaskId> {
        let id = match value {
            Value::Number(number) => number.as_u64().or_else(|| {
                number
                    .as_f64()
                    // `TaskId::MAX as f64` rounds up to 2^64, which is out of range.
                    .filter(|float| {
                        float.fract() == 0.0 && *float >= 0.0 && *float < TaskId::MAX as f64
                    })
                    .map(|float| float as u64)
            }),
            Value::String(text) => text.trim().parse::<TaskId>().ok(),
            _ => None,
        };
        match id {
            Some(id) if id > 0 => Ok(id),
            _ => Err(self.invalid_data(format!(
                "record {index}: `id` must be a positive integer, found {value}"
            ))),
        }
    }

    fn decode_title(&self, index: usize, value: &Value) -> StorageResult<String> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(self.invalid_data(format!(
                "record {index}: `title` must be text, found {}",
                json_kind(other)
            ))),
        }
    }

    fn decode_done(&self, index: usize, record: &Map<String, Value>) -> StorageResult<bool> {
        match record.get("done") {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(Value::Number(number)) => match number.as_u64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.invalid_data(format!(
                    "record {index}: `done` must be a boolean, found {number}"
                ))),
            },
            Some(other) => Err(self.invalid_data(format!(
                "record {index}: `done` must be a boolean, found {}",
                json_kind(other)
            ))),
        }
    }

    fn decode_created_at(
        &self,
        index: usize,
        record: &Map<String, Value>,
    ) -> StorageResult<String> {
        match record.get("created_at") {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(text)) => Ok(text.clone()),
            Some(other) => Err(self.invalid_data(format!(
                "record {index}: `created_at` must be text, found {}",
                json_kind(other)
            ))),
        }
    }

    fn invalid_data(&self, message: String) -> StorageError {
        StorageError::InvalidData {
            path: self.path.clone(),
            message,
        }
    }

    fn write_tasks(&self, tasks: &[Task]) -> StorageResult<()> {
        let mut payload = serde_json::to_string_pretty(tasks).map_err(|source| {
            StorageError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        payload.push('\n');

        let tmp_path = self.tmp_path();
        let tmp_error = |source: io::Error| StorageError::Io {
            path: tmp_path.clone(),
            source,
        };
        let mut file = File::create(&tmp_path).map_err(tmp_error)?;
        file.write_all(payload.as_bytes()).map_err(tmp_error)?;
        file.sync_all().map_err(tmp_error)?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|err| self.io_error(err))
    }
}

impl TaskRepository for JsonTaskRepository {
    fn load(&self) -> StorageResult<Vec<Task>> {
        let started_at = Instant::now();
        match self.read_tasks() {
            Ok(tasks) => {
                info!(
                    "event=store_load module=repo status=ok count={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(tasks)
            }
            Err(err) => {
                error!(
                    "event=store_load module=repo status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> StorageResult<()> {
        let started_at = Instant::now();
        match self.write_tasks(tasks) {
            Ok(()) => {
                debug!(
                    "event=store_save module=repo status=ok count={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=repo status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
