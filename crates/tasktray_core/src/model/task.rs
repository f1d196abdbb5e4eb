//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted record: text, completion flag, reminder.
//! - Own the wire shape of the flat store file (`task`/`done`/`reminder`).
//!
//! # Invariants
//! - `text` is never empty or whitespace-only.
//! - `id` is stable for the lifetime of a task and never reused.
//! - A cleared `reminder` (`None`) is never fired again.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to a task at creation time.
pub type TaskId = Uuid;

/// Absolute point in time at which a reminder becomes due.
pub type Reminder = DateTime<Local>;

/// Validation failures for task construction and persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyText,
    NilId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty"),
            Self::NilId => write!(f, "task id must not be nil"),
        }
    }
}

impl Error for TaskValidationError {}

/// One entry of the task list.
///
/// Serialized through a private wire record, so every decoded task has passed
/// [`Task::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub done: bool,
    pub reminder: Option<Reminder>,
}

impl Task {
    /// Creates an open task with a fresh id.
    ///
    /// # Errors
    /// - `TaskValidationError::EmptyText` when `text` is empty after trimming.
    pub fn new(
        text: impl Into<String>,
        reminder: Option<Reminder>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), text, reminder)
    }

    /// Creates an open task with a caller-provided id.
    pub fn with_id(
        id: TaskId,
        text: impl Into<String>,
        reminder: Option<Reminder>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            text: text.into(),
            done: false,
            reminder,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Returns whether this task's reminder should fire at `now`.
    ///
    /// Completed tasks never fire, even with a past-due reminder.
    pub fn is_reminder_due(&self, now: Reminder) -> bool {
        !self.done && self.reminder.is_some_and(|at| now >= at)
    }

    /// Clears the pending reminder and returns it.
    pub fn take_reminder(&mut self) -> Option<Reminder> {
        self.reminder.take()
    }
}

/// On-disk shape of one task.
///
/// `id` and `reminder` may be absent in files written by older builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TaskRecord {
    #[serde(default)]
    id: Option<TaskId>,
    task: String,
    #[serde(default)]
    done: bool,
    #[serde(default, with = "reminder_format")]
    reminder: Option<Reminder>,
}

impl TaskRecord {
    /// Whether decoding will mint a fresh id for this record.
    pub(crate) fn needs_id(&self) -> bool {
        self.id.is_none()
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let task = Task {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            text: record.task,
            done: record.done,
            reminder: record.reminder,
        };
        task.validate()?;
        Ok(task)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            id: Some(task.id),
            task: task.text,
            done: task.done,
            reminder: task.reminder,
        }
    }
}

/// Formats a reminder the way the store file writes it.
///
/// Sub-second digits are kept, so parsing the output yields `at` exactly.
pub fn format_reminder(at: &Reminder) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parses a reminder timestamp.
///
/// Accepts RFC 3339 with offset, and offset-less ISO-8601 (interpreted in
/// local time) as written by the earlier tool.
pub fn parse_reminder(value: &str) -> Option<Reminder> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    // DST gaps have no local mapping; `earliest` picks the first of an overlap.
    Local.from_local_datetime(&naive).earliest()
}

mod reminder_format {
    use super::{format_reminder, parse_reminder, Reminder};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Reminder>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => s.serialize_str(&format_reminder(at)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Reminder>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => parse_reminder(&text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid reminder timestamp `{text}`"))),
        }
    }
}
