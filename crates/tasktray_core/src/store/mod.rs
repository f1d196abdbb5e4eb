//! Task store contracts and implementations.
//!
//! # Responsibility
//! - Load and save the whole ordered task list as one unit.
//! - Keep file format details inside the persistence boundary.
//!
//! # Invariants
//! - `save` is a full replace, never a merge or append.
//! - `load` rejects malformed persisted state instead of masking it.
//! - Callers outside the store actor must not call `load`/`save` directly
//!   while the actor is running; see `store::actor`.

use crate::model::task::Task;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Mutex;

pub mod actor;
mod json_store;

pub use json_store::JsonTaskStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure for the task store.
#[derive(Debug)]
pub enum StoreError {
    /// The backing file could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Persisted content exists but is not a well-formed task list.
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The in-memory list could not be encoded.
    Encode(serde_json::Error),
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "task store io error at `{}`: {source}", path.display())
            }
            Self::Corrupt { path, source } => {
                write!(f, "corrupt task store `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Whole-collection persistence for the task list.
pub trait TaskStore {
    /// Reads every persisted task in display order.
    fn load(&self) -> StoreResult<Vec<Task>>;
    /// Replaces the persisted collection with `tasks`.
    fn save(&self, tasks: &[Task]) -> StoreResult<()>;
}

impl<S: TaskStore + ?Sized> TaskStore for Box<S> {
    fn load(&self) -> StoreResult<Vec<Task>> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        (**self).save(tasks)
    }
}

/// Process-local store, used by tests and embedders without a data dir.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }
}

impl TaskStore for MemoryTaskStore {
    fn load(&self) -> StoreResult<Vec<Task>> {
        let guard = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let mut guard = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = tasks.to_vec();
        Ok(())
    }
}
