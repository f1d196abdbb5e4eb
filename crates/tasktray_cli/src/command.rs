//! Console command parsing.

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add [+minutes] <text>`
    Add {
        text: String,
        remind_in_minutes: Option<i64>,
    },
    /// `done <n>`, 1-based as displayed.
    Done(usize),
    /// `delete <n>`, 1-based as displayed.
    Delete(usize),
    List,
    Help,
    /// Close the window; the app keeps running in the tray.
    Hide,
    /// Tray menu: restore the window.
    Show,
    /// Tray menu: exit the app.
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" | "list" | "ls" => Command::List,
        "add" | "a" => parse_add(rest),
        "done" | "d" => parse_position(rest).map_or_else(Command::Invalid, Command::Done),
        "delete" | "del" | "rm" => {
            parse_position(rest).map_or_else(Command::Invalid, Command::Delete)
        }
        "help" | "?" => Command::Help,
        "hide" | "close" => Command::Hide,
        "show" => Command::Show,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command `{other}`; type `help`")),
    }
}

fn parse_add(rest: &str) -> Command {
    let Some(after_plus) = rest.strip_prefix('+') else {
        return Command::Add {
            text: rest.to_string(),
            remind_in_minutes: None,
        };
    };
    let (minutes, text) = match after_plus.split_once(char::is_whitespace) {
        Some((minutes, text)) => (minutes, text.trim()),
        None => (after_plus, ""),
    };
    match minutes.parse::<i64>() {
        Ok(minutes) => Command::Add {
            text: text.to_string(),
            remind_in_minutes: Some(minutes).filter(|minutes| *minutes > 0),
        },
        Err(_) => Command::Invalid(format!("`+{minutes}` is not a number of minutes")),
    }
}

fn parse_position(rest: &str) -> Result<usize, String> {
    match rest.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position),
        _ => Err(format!("expected a task number, got `{rest}`")),
    }
}
