//! Reminder scanner loop.
//!
//! Each tick asks the [`ReminderSource`] for reminders due now, then sends
//! one notification per returned task. Ticks are `interval` apart; the
//! wait between ticks is interruptible through [`ScannerHandle::stop`].

use super::ReminderSource;
use crate::model::task::{Reminder, Task};
use crate::notify::{Notification, Notifier};
use crate::service::task_service::TaskResult;
use chrono::Local;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const SCANNER_THREAD_NAME: &str = "reminder-scanner";
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);
const REMINDER_TITLE: &str = "📌 Reminder";

/// Tunables for the scanner loop and the notifications it sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSettings {
    pub interval: Duration,
    pub notification_timeout: Duration,
    pub app_name: String,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SCAN_INTERVAL,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            app_name: "TaskTray".to_string(),
        }
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Reminders cleared in this scan (one notification attempt each).
    pub fired: usize,
    /// Notification attempts that failed. The reminders stay cleared.
    pub delivery_failures: usize,
}

/// Periodic due-reminder checker.
pub struct ReminderScanner<Src, N> {
    source: Src,
    notifier: N,
    settings: ScannerSettings,
}

impl<Src: ReminderSource, N: Notifier> ReminderScanner<Src, N> {
    pub fn new(source: Src, notifier: N, settings: ScannerSettings) -> Self {
        Self {
            source,
            notifier,
            settings,
        }
    }

    /// Runs one scan against the current local time.
    pub fn scan_once(&self) -> TaskResult<ScanReport> {
        self.scan_at(Local::now())
    }

    /// Runs one scan treating `now` as the current time.
    ///
    /// # Errors
    /// - Returns the source error when due reminders could not be collected;
    ///   nothing is notified in that case.
    pub fn scan_at(&self, now: Reminder) -> TaskResult<ScanReport> {
        let due = self.source.take_due(now)?;
        let mut report = ScanReport {
            fired: due.len(),
            delivery_failures: 0,
        };

        for task in &due {
            let notification = self.notification_for(task);
            if let Err(err) = self.notifier.notify(&notification) {
                report.delivery_failures += 1;
                warn!(
                    "event=reminder_notify module=reminder status=error id={} error={}",
                    task.id, err
                );
            } else {
                debug!(
                    "event=reminder_notify module=reminder status=ok id={}",
                    task.id
                );
            }
        }

        Ok(report)
    }

    /// Scans every interval until `stop` receives a message or disconnects.
    pub fn run_until(&self, stop: &Receiver<()>) {
        info!(
            "event=scanner_start module=reminder status=ok interval_secs={}",
            self.settings.interval.as_secs()
        );
        loop {
            let started_at = Instant::now();
            match self.scan_once() {
                Ok(report) if report.fired > 0 => info!(
                    "event=reminder_scan module=reminder status=ok fired={} delivery_failures={} duration_ms={}",
                    report.fired,
                    report.delivery_failures,
                    started_at.elapsed().as_millis()
                ),
                Ok(_) => debug!("event=reminder_scan module=reminder status=idle"),
                Err(err) => error!(
                    "event=reminder_scan module=reminder status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                ),
            }

            match stop.recv_timeout(self.settings.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("event=scanner_stop module=reminder status=ok");
    }

    fn notification_for(&self, task: &Task) -> Notification {
        Notification {
            title: REMINDER_TITLE.to_string(),
            message: format!("⏰ Task: {}", task.text),
            timeout: self.settings.notification_timeout,
            app_name: self.settings.app_name.clone(),
        }
    }
}

impl<Src, N> ReminderScanner<Src, N>
where
    Src: ReminderSource + Send + 'static,
    N: Notifier + 'static,
{
    /// Moves the scanner onto its own thread.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn spawn(self) -> std::io::Result<ScannerHandle> {
        let (stop_tx, stop_rx) = bounded(1);
        let join = std::thread::Builder::new()
            .name(SCANNER_THREAD_NAME.to_string())
            .spawn(move || self.run_until(&stop_rx))?;
        Ok(ScannerHandle {
            stop_tx: Some(stop_tx),
            join: Some(join),
        })
    }
}

/// Owner of a running scanner thread. Dropping it stops the scanner.
pub struct ScannerHandle {
    stop_tx: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ScannerHandle {
    /// Interrupts the wait between scans and joins the thread.
    ///
    /// A scan already in progress finishes first.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("event=scanner_stop module=reminder status=error error_code=thread_panicked");
            }
        }
    }
}

impl Drop for ScannerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
