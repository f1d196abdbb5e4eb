//! Single-writer owner of the task store.
//!
//! # Responsibility
//! - Run every read-modify-write cycle on one dedicated thread.
//! - Give the shell and the reminder scanner a cloneable request handle.
//!
//! # Invariants
//! - Only the actor thread calls `TaskStore::load`/`save` while it runs, so
//!   concurrent callers can never lose each other's updates.
//! - Requests are processed strictly in arrival order.
//! - Shutdown is processed after every request queued before it.

use crate::model::task::{Reminder, Task};
use crate::service::task_service::{TaskError, TaskRef, TaskResult, TaskService};
use crate::store::{StoreResult, TaskStore};
use chrono::Duration;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, info, warn};
use std::thread::JoinHandle;

const ACTOR_THREAD_NAME: &str = "task-store";

enum StoreCommand {
    List {
        reply: Sender<StoreResult<Vec<Task>>>,
    },
    Add {
        text: String,
        delay: Option<Duration>,
        reply: Sender<TaskResult<Task>>,
    },
    Complete {
        target: TaskRef,
        reply: Sender<TaskResult<Task>>,
    },
    Delete {
        target: TaskRef,
        reply: Sender<TaskResult<Task>>,
    },
    TakeDue {
        now: Reminder,
        reply: Sender<StoreResult<Vec<Task>>>,
    },
    Shutdown,
}

impl StoreCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Add { .. } => "add",
            Self::Complete { .. } => "complete",
            Self::Delete { .. } => "delete",
            Self::TakeDue { .. } => "take_due",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Cloneable client of a running [`StoreActor`].
#[derive(Clone)]
pub struct StoreHandle {
    commands: Sender<StoreCommand>,
}

impl StoreHandle {
    pub fn list(&self) -> TaskResult<Vec<Task>> {
        self.request(|reply| StoreCommand::List { reply })?
            .map_err(TaskError::from)
    }

    pub fn add(&self, text: impl Into<String>, delay: Option<Duration>) -> TaskResult<Task> {
        let text = text.into();
        self.request(|reply| StoreCommand::Add { text, delay, reply })?
    }

    pub fn complete(&self, target: impl Into<TaskRef>) -> TaskResult<Task> {
        let target = target.into();
        self.request(|reply| StoreCommand::Complete { target, reply })?
    }

    pub fn delete(&self, target: impl Into<TaskRef>) -> TaskResult<Task> {
        let target = target.into();
        self.request(|reply| StoreCommand::Delete { target, reply })?
    }

    pub fn take_due(&self, now: Reminder) -> TaskResult<Vec<Task>> {
        self.request(|reply| StoreCommand::TakeDue { now, reply })?
            .map_err(TaskError::from)
    }

    fn request<T>(&self, build: impl FnOnce(Sender<T>) -> StoreCommand) -> TaskResult<T> {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(build(reply_tx))
            .map_err(|_| TaskError::StoreUnavailable)?;
        reply_rx.recv().map_err(|_| TaskError::StoreUnavailable)
    }
}

/// Thread that owns a [`TaskService`] and serves [`StoreHandle`] requests.
pub struct StoreActor {
    handle: StoreHandle,
    join: Option<JoinHandle<()>>,
}

impl StoreActor {
    /// Starts the actor thread over `store`.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn spawn<S>(store: S) -> std::io::Result<Self>
    where
        S: TaskStore + Send + 'static,
    {
        let (commands_tx, commands_rx) = unbounded();
        let service = TaskService::new(store);
        let join = std::thread::Builder::new()
            .name(ACTOR_THREAD_NAME.to_string())
            .spawn(move || run(service, commands_rx))?;

        info!("event=store_actor_start module=store status=ok");
        Ok(Self {
            handle: StoreHandle {
                commands: commands_tx,
            },
            join: Some(join),
        })
    }

    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Stops the actor after it drains already-queued requests.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.handle.commands.send(StoreCommand::Shutdown);
        if join.join().is_err() {
            warn!("event=store_actor_stop module=store status=error error_code=thread_panicked");
            return;
        }
        info!("event=store_actor_stop module=store status=ok");
    }
}

impl Drop for StoreActor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<S: TaskStore>(service: TaskService<S>, commands: Receiver<StoreCommand>) {
    for command in commands.iter() {
        debug!(
            "event=store_command module=store status=start command={}",
            command.name()
        );
        // Reply send failures mean the caller gave up waiting; nothing to do.
        match command {
            StoreCommand::List { reply } => {
                let _ = reply.send(service.list());
            }
            StoreCommand::Add { text, delay, reply } => {
                let _ = reply.send(service.add(&text, delay));
            }
            StoreCommand::Complete { target, reply } => {
                let _ = reply.send(service.complete(target));
            }
            StoreCommand::Delete { target, reply } => {
                let _ = reply.send(service.delete(target));
            }
            StoreCommand::TakeDue { now, reply } => {
                let _ = reply.send(service.take_due(now));
            }
            StoreCommand::Shutdown => break,
        }
    }
}
