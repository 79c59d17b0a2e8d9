//! Task use-case service.
//!
//! # Responsibility
//! - Own the authoritative in-memory task collection.
//! - Assign identities, validate titles and expose CRUD, listing and search.
//! - Persist the full collection through the repository after each mutation.
//!
//! # Invariants
//! - Ids are pairwise distinct; the next id is one above the highest id
//!   seen this session, so deleting the newest task never frees its id.
//! - Titles accepted by the service are trimmed and non-empty.
//! - Mutations are write-through: a call returns only after `save` finished.
//! - Validation and not-found failures leave memory and disk unchanged.
//! - A failed `save` leaves the in-memory change applied.

use crate::model::task::{normalize_title, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{StorageError, TaskRepository};
use crate::search::fuzzy::{search_tasks, SearchQuery, TaskMatch};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Input rejected before any state change.
    Validation(TaskValidationError),
    /// No task has the given id.
    NotFound(TaskId),
    /// Persistence-layer failure.
    Storage(StorageError),
}

impl TaskServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task with id={id} not found"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for TaskServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Completion filter for [`TaskService::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Only completed tasks.
    Done,
    /// Only incomplete tasks.
    Pending,
}

impl StatusFilter {
    fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Done => task.done,
            Self::Pending => !task.done,
        }
    }
}

impl From<Option<bool>> for StatusFilter {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Self::All,
            Some(true) => Self::Done,
            Some(false) => Self::Pending,
        }
    }
}

/// Task service facade over a repository implementation.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    /// Highest id loaded or issued since construction.
    last_id: TaskId,
}

impl<R: TaskRepository> TaskService<R> {
    /// Loads the collection once through `repo`.
    ///
    /// # Errors
    /// - Returns `Storage` when the repository cannot load the collection.
    pub fn new(repo: R) -> TaskServiceResult<Self> {
        let tasks = repo.load()?;
        info!(
            "event=service_init module=service status=ok count={}",
            tasks.len()
        );
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        Ok(Self {
            repo,
            tasks,
            last_id,
        })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Creates a task from `title` and persists the collection.
    ///
    /// # Errors
    /// - `Validation(IdsExhausted)` once `TaskId::MAX` has been issued.
    pub fn add(&mut self, title: &str) -> TaskServiceResult<Task> {
        let next_id = self
            .last_id
            .checked_add(1)
            .ok_or(TaskValidationError::IdsExhausted)?;
        let task = Task::new(next_id, title)?;
        self.last_id = task.id;
        self.tasks.push(task.clone());
        info!("event=task_add module=service status=ok id={}", task.id);
        self.persist()?;
        Ok(task)
    }

    /// Returns the task with `id`, or `None`.
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Removes the task with `id` and persists the collection.
    pub fn delete(&mut self, id: TaskId) -> TaskServiceResult<Task> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        info!("event=task_delete module=service status=ok id={id}");
        self.persist()?;
        Ok(removed)
    }

    /// Sets completion state unconditionally and persists.
    pub fn set_done(&mut self, id: TaskId, done: bool) -> TaskServiceResult<Task> {
        let index = self.position(id)?;
        self.tasks[index].done = done;
        info!("event=task_set_done module=service status=ok id={id} done={done}");
        self.persist()?;
        Ok(self.tasks[index].clone())
    }

    /// Marks a task done. Already-done tasks are returned unchanged without
    /// touching storage.
    pub fn mark_done(&mut self, id: TaskId) -> TaskServiceResult<Task> {
        let index = self.position(id)?;
        if self.tasks[index].done {
            debug!("event=task_mark_done module=service status=noop id={id}");
            return Ok(self.tasks[index].clone());
        }
        self.tasks[index].done = true;
        info!("event=task_mark_done module=service status=ok id={id}");
        self.persist()?;
        Ok(self.tasks[index].clone())
    }

    /// Flips completion state and persists.
    pub fn toggle_done(&mut self, id: TaskId) -> TaskServiceResult<Task> {
        let index = self.position(id)?;
        let done = self.tasks[index].toggle();
        info!("event=task_toggle module=service status=ok id={id} done={done}");
        self.persist()?;
        Ok(self.tasks[index].clone())
    }

    /// Renames a task and persists.
    ///
    /// Title validation runs before the id lookup, so a blank title is
    /// reported as a validation error even for unknown ids.
    pub fn update_title(&mut self, id: TaskId, new_title: &str) -> TaskServiceResult<Task> {
        let title = normalize_title(new_title)?;
        let index = self.position(id)?;
        self.tasks[index].title = title;
        info!("event=task_rename module=service status=ok id={id}");
        self.persist()?;
        Ok(self.tasks[index].clone())
    }

    /// Snapshot with incomplete tasks first, each group by ascending id.
    pub fn list(&self, filter: StatusFilter) -> Vec<Task> {
        let mut tasks = self
            .tasks
            .iter()
            .filter(|task| filter.accepts(task))
            .cloned()
            .collect::<Vec<_>>();
        tasks.sort_by_key(|task| (task.done, task.id));
        tasks
    }

    /// Fuzzy title search; see [`crate::search::fuzzy`].
    pub fn search(&self, query: &SearchQuery) -> Vec<TaskMatch> {
        let hits = search_tasks(&self.tasks, query);
        debug!(
            "event=task_search module=service status=ok hits={} limit={} cutoff={}",
            hits.len(),
            query.limit,
            query.score_cutoff
        );
        hits
    }

    fn position(&self, id: TaskId) -> TaskServiceResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| {
                debug!("event=task_lookup module=service status=not_found id={id}");
                TaskServiceError::NotFound(id)
            })
    }

    fn persist(&self) -> TaskServiceResult<()> {
        self.repo.save(&self.tasks).map_err(|err| {
            warn!("event=persist module=service status=error error={err}");
            TaskServiceError::Storage(err)
        })
    }
}
