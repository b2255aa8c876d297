//! services/client/src/terminal/quiz_view.rs
//!
//! Runs a skill quiz in the terminal and reports the score to the Progress
//! Store, which then builds the skill's learning journey.

use crate::error::ClientError;
use crate::terminal::console::Console;
use futures::Stream;
use learning_journey_core::domain::QUIZ_MAX_SCORE;
use learning_journey_core::ports::ProgressStore;
use learning_journey_core::quiz::{QuizRunner, QuizStep};
use std::io::Write;
use tokio_util::codec::LinesCodecError;
use tracing::{info, warn};

const QUIZ_HELP: &str =
    "Type an option number to answer, Enter to continue, `back` for the previous question, `quit` to stop.";

/// How a quiz run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOutcome {
    Submitted { score: u32, total: usize },
    /// The user stopped, declined the retake, or input ran out.
    Abandoned,
}

/// Checks eligibility (unless `force`), asks every question and submits the score.
pub async fn run_quiz<I, W>(
    store: &dyn ProgressStore,
    username: &str,
    skill: &str,
    force: bool,
    console: &mut Console<I, W>,
) -> Result<QuizOutcome, ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    if !force {
        let eligibility = store.can_take_quiz(username, skill).await?;
        if !eligibility.can_take {
            let message = eligibility.message.unwrap_or_else(|| {
                "You have already taken this quiz. Retaking it will reset your learning journey."
                    .to_string()
            });
            console.say(message)?;
            let answer = console.ask("Take the quiz anyway? [y/N] ").await?;
            if !matches!(answer.as_deref(), Some("y" | "Y" | "yes")) {
                return Ok(QuizOutcome::Abandoned);
            }
        }
    }

    console.say(format!("⏳ Loading {} questions...", skill))?;
    let questions = store.get_questions(skill).await?;
    let mut runner = QuizRunner::new(questions)?;
    console.say(QUIZ_HELP)?;

    let (score, total) = loop {
        show_question(&runner, console)?;
        let Some(input) = console.ask("> ").await? else {
            info!("Input closed during the quiz for '{}'", skill);
            return Ok(QuizOutcome::Abandoned);
        };

        match input.to_lowercase().as_str() {
            "quit" | "q" => return Ok(QuizOutcome::Abandoned),
            "back" | "b" => {
                if !runner.previous() {
                    console.say("This is the first question.")?;
                }
                continue;
            }
            "" => {}
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    if let Err(e) = runner.select(n - 1) {
                        console.say(e.user_message())?;
                        continue;
                    }
                }
                _ => {
                    console.say(QUIZ_HELP)?;
                    continue;
                }
            },
        }

        match runner.next() {
            Ok(QuizStep::Advanced(_)) => {}
            Ok(QuizStep::Finished { score, total }) => break (score, total),
            Err(e) => console.say(e.user_message())?,
        }
    };

    console.say(format!("Your Score: {} / {}", score, total))?;
    let submission = runner.submission(username, skill)?;
    if let Err(e) = store.submit_score(&submission).await {
        warn!("Score submission for '{}' failed: {}", skill, e);
        console.say("Failed to submit your score. Please try again.")?;
        return Err(e.into());
    }
    info!("Submitted score {}/{} for skill '{}'", score, QUIZ_MAX_SCORE, skill);
    console.say(format!(
        "Your learning journey is ready. Run `learn journey {}` to start.",
        skill
    ))?;
    Ok(QuizOutcome::Submitted { score, total })
}

fn show_question<I, W>(runner: &QuizRunner, console: &mut Console<I, W>) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    let question = runner.current_question();
    console.say("")?;
    console.say(format!(
        "Question {} of {}: {}",
        runner.current_index() + 1,
        runner.question_count(),
        question.question
    ))?;
    for (i, option) in question.options.iter().enumerate() {
        let marker = if runner.selected() == Some(i) { "*" } else { " " };
        console.say(format!(" {} {}. {}", marker, i + 1, option))?;
    }
    Ok(())
}
