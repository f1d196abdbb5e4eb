//! Console input thread.
//!
//! Blocking stdin reads cannot be interrupted, so this thread is detached
//! and ends with the process.

use crate::command::{parse_command, Command};
use crate::shell::ShellEvent;
use crate::tray::TrayAction;
use crossbeam_channel::Sender;
use log::{debug, warn};
use std::io::BufRead;

const INPUT_THREAD_NAME: &str = "console-input";

/// Where a typed line is delivered.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Foreground(ShellEvent),
    Tray(TrayAction),
}

/// `show` and `quit` are tray menu entries; everything else belongs to the
/// window.
fn route(line: String) -> Route {
    match parse_command(&line) {
        Command::Show => Route::Tray(TrayAction::Show),
        Command::Quit => Route::Tray(TrayAction::Quit),
        _ => Route::Foreground(ShellEvent::Line(line)),
    }
}

pub fn spawn_console_reader(
    foreground: Sender<ShellEvent>,
    tray: Sender<TrayAction>,
) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name(INPUT_THREAD_NAME.to_string())
        .spawn(move || read_lines(std::io::stdin().lock(), &foreground, &tray))?;
    Ok(())
}

fn read_lines(input: impl BufRead, foreground: &Sender<ShellEvent>, tray: &Sender<TrayAction>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("event=console_read module=input status=error error={err}");
                break;
            }
        };
        let delivered = match route(line) {
            Route::Foreground(event) => foreground.send(event).is_ok(),
            // Tray gone (already quitting): fall back to the foreground queue.
            Route::Tray(action) => {
                tray.send(action).is_ok() || foreground.send(fallback(action)).is_ok()
            }
        };
        if !delivered {
            return;
        }
    }
    debug!("event=console_read module=input status=closed");
    let _ = foreground.send(ShellEvent::InputClosed);
}

fn fallback(action: TrayAction) -> ShellEvent {
    match action {
        TrayAction::Show => ShellEvent::ShowWindow,
        TrayAction::Quit => ShellEvent::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::{read_lines, route, Route};
    use crate::shell::ShellEvent;
    use crate::tray::TrayAction;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;

    #[test]
    fn tray_entries_route_to_tray() {
        assert_eq!(route("show".to_string()), Route::Tray(TrayAction::Show));
        assert_eq!(route(" quit ".to_string()), Route::Tray(TrayAction::Quit));
        assert_eq!(
            route("hide".to_string()),
            Route::Foreground(ShellEvent::Line("hide".to_string()))
        );
    }

    #[test]
    fn end_of_input_is_reported() {
        let (fg_tx, fg_rx) = unbounded();
        let (tray_tx, tray_rx) = unbounded();

        read_lines(Cursor::new("add milk\nshow\n"), &fg_tx, &tray_tx);

        assert_eq!(
            fg_rx.try_iter().collect::<Vec<_>>(),
            vec![
                ShellEvent::Line("add milk".to_string()),
                ShellEvent::InputClosed
            ]
        );
        assert_eq!(tray_rx.try_recv(), Ok(TrayAction::Show));
    }
}
