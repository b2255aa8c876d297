//! services/client/src/terminal/console.rs
//!
//! Line-oriented terminal I/O shared by every view. Input is any stream of
//! lines so the views can be driven by scripted input in tests.

use crate::error::ClientError;
use futures::{Stream, StreamExt};
use std::io::{self, Write};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

pub type StdinLines = FramedRead<tokio::io::Stdin, LinesCodec>;

pub struct Console<I, W> {
    lines: I,
    out: W,
}

/// A console reading the process's stdin and writing to stdout.
pub fn stdin_console() -> Console<StdinLines, io::Stdout> {
    Console::new(
        FramedRead::new(tokio::io::stdin(), LinesCodec::new()),
        io::stdout(),
    )
}

impl<I, W> Console<I, W>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    pub fn new(lines: I, out: W) -> Self {
        Self { lines, out }
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", text.as_ref())?;
        self.out.flush()
    }

    /// The next trimmed input line, or `None` once input is closed.
    ///
    /// Cancel safe: dropping the future loses no input.
    pub async fn next_line(&mut self) -> Result<Option<String>, ClientError> {
        match self.lines.next().await {
            Some(Ok(line)) => Ok(Some(line.trim().to_string())),
            Some(Err(LinesCodecError::Io(e))) => Err(ClientError::Io(e)),
            Some(Err(e)) => Err(ClientError::Internal(e.to_string())),
            None => Ok(None),
        }
    }

    /// Prints `prompt` without a newline and waits for an answer.
    pub async fn ask(&mut self, prompt: &str) -> Result<Option<String>, ClientError> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        self.next_line().await
    }

    pub fn into_output(self) -> W {
        self.out
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::*;

    #[tokio::test]
    async fn test_lines_are_trimmed_and_end_with_none() {
        let mut console = console(&["  show  "]);
        assert_eq!(console.next_line().await.unwrap().as_deref(), Some("show"));
        assert!(console.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ask_writes_prompt() {
        let mut console = console(&["y"]);
        let answer = console.ask("Continue? ").await.unwrap();
        assert_eq!(answer.as_deref(), Some("y"));
        console.say("done").unwrap();
        assert_eq!(output(console), "Continue? done\n");
    }
}
