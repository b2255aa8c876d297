//! services/client/src/terminal/command.rs
//!
//! The commands a user can type inside the interactive journey view.

use std::str::FromStr;

pub const JOURNEY_HELP: &str = "\
Commands:
  show      show the current chapter
  list      list all chapters
  go <n>    open chapter n
  done      mark the current chapter as completed
  undo      mark the current chapter as incomplete
  next      generate the next chapter
  close     close the celebration
  help      show this help
  quit      leave the journey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyCommand {
    Show,
    List,
    /// Opens a chapter by its 1-based number.
    Go(usize),
    Done,
    Undo,
    Next,
    Close,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type `help` for the list of commands.")]
    Unknown(String),
    #[error("`go` needs a chapter number, e.g. `go 2`.")]
    MissingChapter,
    #[error("'{0}' is not a chapter number.")]
    BadChapter(String),
}

impl FromStr for JourneyCommand {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut words = input.split_whitespace();
        let verb = words.next().unwrap_or_default().to_lowercase();
        let command = match verb.as_str() {
            "show" | "s" => JourneyCommand::Show,
            "list" | "ls" => JourneyCommand::List,
            "go" | "open" => {
                let arg = words.next().ok_or(CommandError::MissingChapter)?;
                match arg.parse::<usize>() {
                    Ok(n) if n >= 1 => JourneyCommand::Go(n),
                    _ => return Err(CommandError::BadChapter(arg.to_string())),
                }
            }
            "done" | "complete" => JourneyCommand::Done,
            "undo" | "incomplete" => JourneyCommand::Undo,
            "next" | "generate" => JourneyCommand::Next,
            "close" | "dismiss" => JourneyCommand::Close,
            "help" | "?" => JourneyCommand::Help,
            "quit" | "exit" | "q" => JourneyCommand::Quit,
            _ => return Err(CommandError::Unknown(input.trim().to_string())),
        };
        Ok(command)
    }
}
