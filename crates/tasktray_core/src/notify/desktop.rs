//! Desktop notification backend built on platform helper programs.
//!
//! - Linux/BSD: `notify-send`
//! - macOS: `osascript` (`display notification`)
//! - Windows: PowerShell balloon tip

use super::{Notification, NotifyError, NotifyResult, Notifier};
use log::{debug, warn};
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    NotifySend,
    Osascript,
    PowerShell,
}

impl Backend {
    fn program(self) -> &'static str {
        match self {
            Self::NotifySend => "notify-send",
            Self::Osascript => "osascript",
            Self::PowerShell => "powershell",
        }
    }

    fn for_current_platform() -> Self {
        if cfg!(target_os = "windows") {
            Self::PowerShell
        } else if cfg!(target_os = "macos") {
            Self::Osascript
        } else {
            Self::NotifySend
        }
    }
}

/// Notifier that shells out to the platform's notification helper.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    backend: Backend,
    program_path: PathBuf,
}

impl DesktopNotifier {
    /// Locates the helper program for the current platform on `PATH`.
    ///
    /// # Errors
    /// - `NotifyError::Unavailable` when the helper is not installed.
    pub fn detect() -> NotifyResult<Self> {
        let backend = Backend::for_current_platform();
        let program_path = which::which(backend.program()).map_err(|err| {
            NotifyError::Unavailable(format!("`{}` not found: {err}", backend.program()))
        })?;
        debug!(
            "event=notifier_select module=notify status=ok backend={} path={}",
            backend.program(),
            program_path.display()
        );
        Ok(Self {
            backend,
            program_path,
        })
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) -> NotifyResult<()> {
        let program = self.backend.program();
        let mut command = Command::new(&self.program_path);
        command
            .args(helper_args(self.backend, notification))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // The balloon script sleeps for the whole timeout; do not wait on it.
        if self.backend == Backend::PowerShell {
            command
                .spawn()
                .map_err(|source| NotifyError::Spawn { program, source })?;
            return Ok(());
        }

        let status = command
            .status()
            .map_err(|source| NotifyError::Spawn { program, source })?;
        if !status.success() {
            warn!(
                "event=notify module=notify status=error backend={} exit_code={:?}",
                program,
                status.code()
            );
            return Err(NotifyError::Failed {
                program,
                status: status.code(),
            });
        }
        Ok(())
    }
}

fn helper_args(backend: Backend, notification: &Notification) -> Vec<String> {
    let timeout_ms = notification.timeout.as_millis().to_string();
    match backend {
        Backend::NotifySend => vec![
            "--app-name".to_string(),
            notification.app_name.clone(),
            "--expire-time".to_string(),
            timeout_ms,
            "--".to_string(),
            notification.title.clone(),
            notification.message.clone(),
        ],
        Backend::Osascript => vec![
            "-e".to_string(),
            format!(
                "display notification \"{}\" with title \"{}\" subtitle \"{}\"",
                escape_applescript(&notification.message),
                escape_applescript(&notification.app_name),
                escape_applescript(&notification.title),
            ),
        ],
        Backend::PowerShell => vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-Command".to_string(),
            format!(
                "Add-Type -AssemblyName System.Windows.Forms; \
                 Add-Type -AssemblyName System.Drawing; \
                 $n = New-Object System.Windows.Forms.NotifyIcon; \
                 $n.Icon = [System.Drawing.SystemIcons]::Information; \
                 $n.Text = '{app}'; \
                 $n.BalloonTipTitle = '{title}'; \
                 $n.BalloonTipText = '{message}'; \
                 $n.Visible = $true; \
                 $n.ShowBalloonTip({timeout_ms}); \
                 Start-Sleep -Milliseconds {timeout_ms}; \
                 $n.Dispose()",
                app = escape_powershell(&notification.app_name),
                title = escape_powershell(&notification.title),
                message = escape_powershell(&notification.message),
            ),
        ],
    }
}

fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_powershell(value: &str) -> String {
    value.replace('\'', "''")
}
