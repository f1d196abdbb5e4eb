//! Reminder scanning.
//!
//! # Responsibility
//! - Periodically collect due reminders and turn them into notifications.
//!
//! # Invariants
//! - A reminder is cleared and persisted before its notification is sent,
//!   so one reminder produces at most one notification.
//! - No single scan failure stops the loop.

use crate::model::task::{Reminder, Task};
use crate::service::task_service::{TaskResult, TaskService};
use crate::store::actor::StoreHandle;
use crate::store::TaskStore;

mod scanner;

pub use scanner::{
    ReminderScanner, ScanReport, ScannerHandle, ScannerSettings, DEFAULT_NOTIFICATION_TIMEOUT,
    DEFAULT_SCAN_INTERVAL,
};

/// Supplies due reminders to the scanner.
///
/// Implementations must clear and persist the returned reminders as one
/// serialized step.
pub trait ReminderSource {
    fn take_due(&self, now: Reminder) -> TaskResult<Vec<Task>>;
}

impl ReminderSource for StoreHandle {
    fn take_due(&self, now: Reminder) -> TaskResult<Vec<Task>> {
        StoreHandle::take_due(self, now)
    }
}

impl<S: TaskStore> ReminderSource for TaskService<S> {
    fn take_due(&self, now: Reminder) -> TaskResult<Vec<Task>> {
        Ok(TaskService::take_due(self, now)?)
    }
}
