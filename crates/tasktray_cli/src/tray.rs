//! Tray controller.
//!
//! Runs its own event loop on a dedicated thread. Menu actions are never
//! applied there; they are re-dispatched onto the foreground queue as
//! [`ShellEvent`]s.

use crate::shell::ShellEvent;
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use log::{debug, info, warn};
use std::thread::JoinHandle;

const TRAY_THREAD_NAME: &str = "tray";

/// Entries of the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Show,
    Quit,
}

pub struct TrayController {
    menu: Sender<TrayAction>,
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl TrayController {
    /// Starts the tray loop, forwarding menu actions to `foreground`.
    pub fn spawn(foreground: Sender<ShellEvent>) -> std::io::Result<Self> {
        let (menu_tx, menu_rx) = unbounded();
        let (stop_tx, stop_rx) = bounded(1);
        let join = std::thread::Builder::new()
            .name(TRAY_THREAD_NAME.to_string())
            .spawn(move || run(menu_rx, stop_rx, foreground))?;
        Ok(Self {
            menu: menu_tx,
            stop: Some(stop_tx),
            join: Some(join),
        })
    }

    /// Handle used by whatever surfaces the menu to the user.
    pub fn menu(&self) -> Sender<TrayAction> {
        self.menu.clone()
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.try_send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("event=tray_stop module=tray status=error error_code=thread_panicked");
            }
        }
    }
}

impl Drop for TrayController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(menu: Receiver<TrayAction>, stop: Receiver<()>, foreground: Sender<ShellEvent>) {
    info!("event=tray_start module=tray status=ok");
    loop {
        select! {
            recv(menu) -> action => {
                let Ok(action) = action else { break };
                debug!("event=tray_action module=tray status=ok action={action:?}");
                let event = match action {
                    TrayAction::Show => ShellEvent::ShowWindow,
                    TrayAction::Quit => ShellEvent::Quit,
                };
                if foreground.send(event).is_err() || action == TrayAction::Quit {
                    break;
                }
            }
            recv(stop) -> _ => break,
        }
    }
    info!("event=tray_stop module=tray status=ok");
}
