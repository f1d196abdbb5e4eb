//! Launch-on-login registration.
//!
//! # Responsibility
//! - Register the running executable to start at user login.
//!
//! # Invariants
//! - Registration is best effort; callers log failures and continue.
//! - Re-registering with the same executable is a no-op on disk.
//!
//! Per platform:
//! - Windows: `HKCU\Software\Microsoft\Windows\CurrentVersion\Run` value.
//! - macOS: `~/Library/LaunchAgents/<label>.plist`.
//! - Linux/BSD: XDG `~/.config/autostart/<name>.desktop`.

use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const WINDOWS_RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";
const LAUNCH_AGENT_LABEL_PREFIX: &str = "io.tasktray";

pub type AutostartResult<T> = Result<T, AutostartError>;

#[derive(Debug)]
pub enum AutostartError {
    NoHomeDirectory,
    Io { path: PathBuf, source: std::io::Error },
    Command { program: &'static str, detail: String },
}

impl Display for AutostartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHomeDirectory => write!(f, "cannot resolve the user's home directory"),
            Self::Io { path, source } => {
                write!(f, "failed to write autostart entry `{}`: {source}", path.display())
            }
            Self::Command { program, detail } => write!(f, "`{program}` failed: {detail}"),
        }
    }
}

impl Error for AutostartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NoHomeDirectory | Self::Command { .. } => None,
        }
    }
}

/// Where an autostart registration was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutostartLocation {
    File(PathBuf),
    Registry { key: &'static str, value: String },
}

/// Registers `executable` to run at login under `app_name`.
pub fn register_autostart(app_name: &str, executable: &Path) -> AutostartResult<AutostartLocation> {
    let location = if cfg!(target_os = "windows") {
        register_windows(app_name, executable)?
    } else if cfg!(target_os = "macos") {
        let dir = dirs::home_dir()
            .ok_or(AutostartError::NoHomeDirectory)?
            .join("Library")
            .join("LaunchAgents");
        let label = launch_agent_label(app_name);
        let contents = launch_agent_plist(&label, executable);
        AutostartLocation::File(write_entry(&dir, &format!("{label}.plist"), &contents)?)
    } else {
        let dir = dirs::config_dir()
            .ok_or(AutostartError::NoHomeDirectory)?
            .join("autostart");
        let contents = desktop_entry(app_name, executable);
        let file_name = format!("{}.desktop", slug(app_name));
        AutostartLocation::File(write_entry(&dir, &file_name, &contents)?)
    };

    info!("event=autostart_register module=autostart status=ok location={location:?}");
    Ok(location)
}

fn register_windows(app_name: &str, executable: &Path) -> AutostartResult<AutostartLocation> {
    let program = "reg";
    let value = format!("\"{}\"", executable.display());
    let output = Command::new(program)
        .args(["add", WINDOWS_RUN_KEY, "/v", app_name, "/t", "REG_SZ", "/d"])
        .arg(&value)
        .arg("/f")
        .stdin(Stdio::null())
        .output()
        .map_err(|err| AutostartError::Command {
            program,
            detail: err.to_string(),
        })?;
    if !output.status.success() {
        return Err(AutostartError::Command {
            program,
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(AutostartLocation::Registry {
        key: WINDOWS_RUN_KEY,
        value: app_name.to_string(),
    })
}

/// Writes `contents` to `dir/file_name` unless it already holds exactly that.
pub fn write_entry(dir: &Path, file_name: &str, contents: &str) -> AutostartResult<PathBuf> {
    let path = dir.join(file_name);
    if fs::read_to_string(&path).is_ok_and(|existing| existing == contents) {
        debug!("event=autostart_register module=autostart status=unchanged");
        return Ok(path);
    }
    let io_error = |source| AutostartError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_error)?;
    fs::write(&path, contents).map_err(io_error)?;
    Ok(path)
}

/// XDG autostart entry for `executable`.
pub fn desktop_entry(app_name: &str, executable: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={app_name}\n\
         Exec=\"{}\"\n\
         Terminal=true\n\
         X-GNOME-Autostart-enabled=true\n",
        executable.display()
    )
}

/// LaunchAgent property list that runs `executable` at login.
pub fn launch_agent_plist(label: &str, executable: &Path) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\">\n\
         <dict>\n\
         \t<key>Label</key>\n\
         \t<string>{}</string>\n\
         \t<key>ProgramArguments</key>\n\
         \t<array>\n\
         \t\t<string>{}</string>\n\
         \t</array>\n\
         \t<key>RunAtLoad</key>\n\
         \t<true/>\n\
         </dict>\n\
         </plist>\n",
        escape_xml(label),
        escape_xml(&executable.display().to_string())
    )
}

fn launch_agent_label(app_name: &str) -> String {
    format!("{LAUNCH_AGENT_LABEL_PREFIX}.{}", slug(app_name))
}

fn slug(app_name: &str) -> String {
    let slug: String = app_name
        .chars()
        .filter_map(|ch| match ch {
            'a'..='z' | '0'..='9' | '-' => Some(ch),
            'A'..='Z' => Some(ch.to_ascii_lowercase()),
            ' ' | '_' | '.' => Some('-'),
            _ => None,
        })
        .collect();
    if slug.is_empty() {
        "tasktray".to_string()
    } else {
        slug
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
