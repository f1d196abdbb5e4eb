//! Foreground presentation shell.
//!
//! # Responsibility
//! - Own the console "window": render the list and run user commands.
//! - Apply tray actions, which always arrive through the event queue.
//!
//! # Invariants
//! - Only the foreground thread touches shell state.
//! - The list is re-rendered from a fresh snapshot after every mutation.
//! - Positions typed by the user resolve to stable ids from the last
//!   rendered snapshot before any mutation is sent.

use crate::command::{parse_command, Command};
use crate::render::{task_lines, HELP};
use chrono::Duration;
use crossbeam_channel::Receiver;
use log::{debug, error, info};
use std::io::{self, Write};
use tasktray_core::{StoreHandle, Task, TaskError, TaskRef};

/// Events delivered to the foreground loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// A console line typed while the window is visible.
    Line(String),
    ShowWindow,
    HideWindow,
    Quit,
    /// The console reached end of input.
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<W: Write> {
    store: StoreHandle,
    out: W,
    app_name: String,
    visible: bool,
    snapshot: Vec<Task>,
}

impl<W: Write> Shell<W> {
    pub fn new(store: StoreHandle, out: W, app_name: impl Into<String>) -> Self {
        Self {
            store,
            out,
            app_name: app_name.into(),
            visible: true,
            snapshot: Vec::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Processes events until Quit or end of input.
    pub fn run(&mut self, events: &Receiver<ShellEvent>) -> io::Result<()> {
        writeln!(self.out, "{} (type `help` for commands)", self.app_name)?;
        self.refresh()?;
        for event in events.iter() {
            if self.handle(event)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    pub fn handle(&mut self, event: ShellEvent) -> io::Result<Flow> {
        match event {
            ShellEvent::Line(line) => self.handle_line(&line),
            ShellEvent::ShowWindow => {
                if !self.visible {
                    self.visible = true;
                    info!("event=window_show module=shell status=ok");
                }
                self.refresh()?;
                Ok(Flow::Continue)
            }
            ShellEvent::HideWindow => {
                self.visible = false;
                info!("event=window_hide module=shell status=ok");
                writeln!(
                    self.out,
                    "{} is running in the tray; type `show` to restore or `quit` to exit.",
                    self.app_name
                )?;
                Ok(Flow::Continue)
            }
            ShellEvent::Quit | ShellEvent::InputClosed => Ok(Flow::Exit),
        }
    }

    fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        if !self.visible {
            writeln!(self.out, "(in tray) type `show` or `quit`.")?;
            return Ok(Flow::Continue);
        }

        match parse_command(line) {
            Command::Add {
                text,
                remind_in_minutes,
            } => self.add(&text, remind_in_minutes)?,
            Command::Done(position) => {
                let outcome = self
                    .target_for(position)
                    .and_then(|target| self.store.complete(target).map(|_| ()));
                self.finish_mutation("complete", outcome)?;
            }
            Command::Delete(position) => {
                let outcome = self
                    .target_for(position)
                    .and_then(|target| self.store.delete(target).map(|_| ()));
                self.finish_mutation("delete", outcome)?;
            }
            Command::List => self.refresh()?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Hide => return self.handle(ShellEvent::HideWindow),
            // Tray actions are routed through the tray controller by the input
            // thread; reaching here means they were typed into the window.
            Command::Show => self.refresh()?,
            Command::Quit => return Ok(Flow::Exit),
            Command::Invalid(message) => writeln!(self.out, "{message}")?,
        }
        Ok(Flow::Continue)
    }

    fn add(&mut self, text: &str, remind_in_minutes: Option<i64>) -> io::Result<()> {
        let delay = remind_in_minutes.and_then(Duration::try_minutes);
        match self.store.add(text, delay) {
            Err(TaskError::Validation(err)) => {
                debug!("event=task_add module=shell status=rejected reason={err}");
                writeln!(self.out, "Warning: Enter a task!")
            }
            outcome => self.finish_mutation("add", outcome.map(|_| ())),
        }
    }

    /// Maps a 1-based display position onto the task shown there.
    ///
    /// Positions outside the rendered list never address the live list.
    fn target_for(&self, position: usize) -> Result<TaskRef, TaskError> {
        let index = position.saturating_sub(1);
        self.snapshot
            .get(index)
            .map(|task| TaskRef::Id(task.id))
            .ok_or(TaskError::IndexOutOfRange {
                index,
                len: self.snapshot.len(),
            })
    }

    fn finish_mutation(&mut self, op: &str, outcome: Result<(), TaskError>) -> io::Result<()> {
        match outcome {
            Ok(()) => {}
            Err(err) if err.is_stale_reference() => {
                debug!("event=task_{op} module=shell status=stale error={err}");
            }
            Err(err) => {
                error!("event=task_{op} module=shell status=error error={err}");
                writeln!(self.out, "Could not {op} task: {err}")?;
            }
        }
        self.refresh()
    }

    fn refresh(&mut self) -> io::Result<()> {
        if !self.visible {
            return Ok(());
        }
        match self.store.list() {
            Ok(tasks) => self.snapshot = tasks,
            Err(err) => {
                error!("event=task_list module=shell status=error error={err}");
                writeln!(self.out, "Could not load tasks: {err}")?;
                self.snapshot.clear();
            }
        }

        if self.snapshot.is_empty() {
            writeln!(self.out, "(no tasks)")?;
        }
        for line in task_lines(&self.snapshot) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}
