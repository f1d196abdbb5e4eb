//! Task use-case service.
//!
//! # Responsibility
//! - Provide Add / Complete / Delete / List as whole-list read-modify-write
//!   cycles over a `TaskStore`.
//! - Provide the reminder scanner's "take due reminders" cycle.
//!
//! # Invariants
//! - Every mutation reloads the store immediately before changing it.
//! - A failed load never leads to a save; corrupt files are left untouched.
//! - Validation runs before the store is touched.

use crate::model::task::{Reminder, Task, TaskId, TaskValidationError};
use crate::store::{StoreError, StoreResult, TaskStore};
use chrono::{Duration, Local};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskResult<T> = Result<T, TaskError>;

/// Addresses one task either by display position or by stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRef {
    Index(usize),
    Id(TaskId),
}

impl From<usize> for TaskRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<TaskId> for TaskRef {
    fn from(id: TaskId) -> Self {
        Self::Id(id)
    }
}

/// Failure of a task operation.
#[derive(Debug)]
pub enum TaskError {
    Validation(TaskValidationError),
    IndexOutOfRange { index: usize, len: usize },
    NotFound(TaskId),
    Store(StoreError),
    /// The store actor is no longer running.
    StoreUnavailable,
}

impl TaskError {
    /// Stale selections surface as one of these; the shell treats them as no-ops.
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::NotFound(_))
    }
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "task index {index} out of range for {len} tasks")
            }
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::StoreUnavailable => write!(f, "task store is not running"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::IndexOutOfRange { .. } | Self::NotFound(_) | Self::StoreUnavailable => None,
        }
    }
}

impl From<TaskValidationError> for TaskError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TaskError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case service wrapper around one task store.
pub struct TaskService<S: TaskStore> {
    store: S,
}

impl<S: TaskStore> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the full ordered task list.
    pub fn list(&self) -> StoreResult<Vec<Task>> {
        self.store.load()
    }

    /// Appends a new open task, with a reminder `delay` after now.
    pub fn add(&self, text: &str, delay: Option<Duration>) -> TaskResult<Task> {
        self.add_at(text, delay, Local::now())
    }

    /// Same as [`TaskService::add`] with an explicit creation time.
    ///
    /// # Contract
    /// - `delay` of `None`, zero, or negative yields `reminder = None`.
    /// - The store is untouched when `text` fails validation.
    pub fn add_at(&self, text: &str, delay: Option<Duration>, now: Reminder) -> TaskResult<Task> {
        let reminder = delay
            .filter(|delay| *delay > Duration::zero())
            .and_then(|delay| now.checked_add_signed(delay));
        let task = Task::new(text, reminder)?;

        let mut tasks = self.store.load()?;
        tasks.push(task.clone());
        self.store.save(&tasks)?;

        info!(
            "event=task_add module=service status=ok id={} text_len={} has_reminder={}",
            task.id,
            task.text.chars().count(),
            task.reminder.is_some()
        );
        Ok(task)
    }

    /// Marks the addressed task done and returns its updated state.
    pub fn complete(&self, target: impl Into<TaskRef>) -> TaskResult<Task> {
        let target = target.into();
        let mut tasks = self.store.load()?;
        let index = resolve(&tasks, target)?;
        tasks[index].mark_done();
        let updated = tasks[index].clone();
        self.store.save(&tasks)?;

        info!(
            "event=task_complete module=service status=ok id={} index={}",
            updated.id, index
        );
        Ok(updated)
    }

    /// Removes the addressed task and returns it.
    pub fn delete(&self, target: impl Into<TaskRef>) -> TaskResult<Task> {
        let target = target.into();
        let mut tasks = self.store.load()?;
        let index = resolve(&tasks, target)?;
        let removed = tasks.remove(index);
        self.store.save(&tasks)?;

        info!(
            "event=task_delete module=service status=ok id={} index={} remaining={}",
            removed.id,
            index,
            tasks.len()
        );
        Ok(removed)
    }

    /// Clears every reminder due at `now` and returns the affected tasks.
    ///
    /// # Contract
    /// - Only open tasks with `now >= reminder` are selected.
    /// - The store is written only when at least one reminder was cleared.
    /// - Returned tasks carry the reminder value that fired.
    pub fn take_due(&self, now: Reminder) -> StoreResult<Vec<Task>> {
        let mut tasks = self.store.load()?;
        let mut fired = Vec::new();

        for task in tasks.iter_mut().filter(|task| task.is_reminder_due(now)) {
            let snapshot = task.clone();
            task.take_reminder();
            fired.push(snapshot);
        }

        if fired.is_empty() {
            debug!("event=take_due module=service status=idle");
            return Ok(fired);
        }

        if let Err(err) = self.store.save(&tasks) {
            warn!(
                "event=take_due module=service status=error error_code=persist_failed due={}",
                fired.len()
            );
            return Err(err);
        }

        info!(
            "event=take_due module=service status=ok fired={}",
            fired.len()
        );
        Ok(fired)
    }
}

fn resolve(tasks: &[Task], target: TaskRef) -> TaskResult<usize> {
    match target {
        TaskRef::Index(index) if index < tasks.len() => Ok(index),
        TaskRef::Index(index) => Err(TaskError::IndexOutOfRange {
            index,
            len: tasks.len(),
        }),
        TaskRef::Id(id) => tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskError::NotFound(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskError, TaskRef, TaskService};
    use crate::model::task::Task;
    use crate::store::MemoryTaskStore;
    use chrono::{Duration, Local};

    fn service_with(texts: &[&str]) -> TaskService<MemoryTaskStore> {
        let tasks = texts
            .iter()
            .map(|text| Task::new(*text, None).unwrap())
            .collect();
        TaskService::new(MemoryTaskStore::with_tasks(tasks))
    }

    #[test]
    fn negative_delay_means_no_reminder() {
        let service = service_with(&[]);
        let task = service
            .add("water plants", Some(Duration::minutes(-3)))
            .unwrap();
        assert_eq!(task.reminder, None);
    }

    #[test]
    fn id_reference_survives_index_shift() {
        let service = service_with(&["a", "b", "c"]);
        let c_id = service.list().unwrap()[2].id;

        service.delete(TaskRef::Index(0)).unwrap();
        let completed = service.complete(TaskRef::Id(c_id)).unwrap();

        assert_eq!(completed.text, "c");
        assert!(completed.done);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let service = service_with(&["a"]);
        let ghost = Task::new("ghost", None).unwrap();
        let err = service.delete(ghost.id).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(id) if id == ghost.id));
        assert!(err.is_stale_reference());
    }

    #[test]
    fn take_due_leaves_future_reminders_alone() {
        let now = Local::now();
        let service = service_with(&[]);
        service
            .add_at("later", Some(Duration::minutes(30)), now)
            .unwrap();

        let fired = service.take_due(now).unwrap();
        assert!(fired.is_empty());
        assert!(service.list().unwrap()[0].reminder.is_some());
    }
}
