//! Core logic for TaskTray.
//! This crate owns the task list, its file store, and the reminder scanner.

pub mod autostart;
pub mod config;
pub mod logging;
pub mod model;
pub mod notify;
pub mod reminder;
pub mod service;
pub mod store;

pub use autostart::{register_autostart, AutostartError, AutostartLocation};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Reminder, Task, TaskId, TaskValidationError};
pub use notify::{
    default_notifier, DesktopNotifier, LogNotifier, Notification, Notifier, NotifyError,
};
pub use reminder::{ReminderScanner, ReminderSource, ScanReport, ScannerHandle, ScannerSettings};
pub use service::task_service::{TaskError, TaskRef, TaskResult, TaskService};
pub use store::actor::{StoreActor, StoreHandle};
pub use store::{JsonTaskStore, MemoryTaskStore, StoreError, StoreResult, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
