//! Task list rendering.

use tasktray_core::Task;

const REMINDER_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One display line per task, numbered from 1.
pub fn task_lines(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let status = if task.done { "✅" } else { "❌" };
            let reminder = task
                .reminder
                .map(|at| format!(" | ⏰ {}", at.format(REMINDER_DISPLAY_FORMAT)))
                .unwrap_or_default();
            format!("{}. {status} {}{reminder}", index + 1, task.text)
        })
        .collect()
}

pub const HELP: &str = "\
commands:
  add [+minutes] <text>   add a task, optionally with a reminder
  done <n>                mark task n done
  delete <n>              delete task n
  list                    show tasks (or press enter)
  hide                    minimize to tray
  show                    restore from tray
  quit                    exit";
