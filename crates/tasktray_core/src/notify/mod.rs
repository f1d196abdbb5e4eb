//! Desktop notification contracts.
//!
//! # Responsibility
//! - Define the fire-and-forget notification seam used by the scanner.
//! - Provide a desktop backend and a log-only fallback.
//!
//! # Invariants
//! - Delivery failures are reported as values, never panics.
//! - No delivery confirmation is awaited beyond the backend process exit.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod desktop;

pub use desktop::DesktopNotifier;

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Content of one desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub timeout: Duration,
    pub app_name: String,
}

/// Notification delivery failure.
#[derive(Debug)]
pub enum NotifyError {
    /// No notification service or helper program is available.
    Unavailable(String),
    /// The helper program could not be started.
    Spawn {
        program: &'static str,
        source: std::io::Error,
    },
    /// The helper program ran but reported failure.
    Failed {
        program: &'static str,
        status: Option<i32>,
    },
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "notifications unavailable: {reason}"),
            Self::Spawn { program, source } => write!(f, "failed to start `{program}`: {source}"),
            Self::Failed { program, status } => match status {
                Some(code) => write!(f, "`{program}` exited with status {code}"),
                None => write!(f, "`{program}` was terminated by a signal"),
            },
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Unavailable(_) | Self::Failed { .. } => None,
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> NotifyResult<()>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, notification: &Notification) -> NotifyResult<()> {
        (**self).notify(notification)
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: &Notification) -> NotifyResult<()> {
        (**self).notify(notification)
    }
}

/// Fallback notifier that only writes the reminder to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> NotifyResult<()> {
        info!(
            "event=notify module=notify status=ok backend=log title_len={} message_len={}",
            notification.title.chars().count(),
            notification.message.chars().count()
        );
        Ok(())
    }
}

/// Picks the desktop backend when one is installed, otherwise the log.
pub fn default_notifier() -> Box<dyn Notifier> {
    match DesktopNotifier::detect() {
        Ok(desktop) => Box::new(desktop),
        Err(err) => {
            info!(
                "event=notifier_select module=notify status=fallback backend=log reason={}",
                err
            );
            Box::new(LogNotifier)
        }
    }
}
