//! services/client/src/terminal/journey_view.rs
//!
//! The interactive learning-journey view. One event loop interleaves typed
//! commands, the chapter-generation request, the timers that clear the cooldown
//! notice and the celebration, and shutdown.

use crate::error::ClientError;
use crate::terminal::command::{JourneyCommand, JOURNEY_HELP};
use crate::terminal::console::Console;
use futures::Stream;
use learning_journey_core::domain::Chapter;
use learning_journey_core::journey::{
    ChapterView, GenerationTicket, JourneyController, JourneyPhase, LOCKED_CHAPTER_MESSAGE,
};
use learning_journey_core::ports::{PortError, PortResult, ProgressStore};
use std::io::Write;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::codec::LinesCodecError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub const CELEBRATION_MESSAGE: &str = "🎉 Yay! You've completed the course! (type `close` to dismiss)";

type PendingGeneration = Option<(GenerationTicket, JoinHandle<PortResult<Chapter>>)>;

/// Whether the loop keeps going after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs the journey view for `skill` until the user quits, input ends, or
/// `shutdown` fires. A store request still in flight at that point is
/// abandoned and its result never applied.
pub async fn run_journey_view<I, W>(
    store: Arc<dyn ProgressStore>,
    username: &str,
    skill: &str,
    console: &mut Console<I, W>,
    shutdown: CancellationToken,
) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    console.say(format!("⏳ Loading learning journey for {}...", skill))?;
    let loaded = tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            info!("Journey view closed while loading.");
            return Ok(());
        }
        result = JourneyController::load(store, username, skill) => result,
    };
    let mut controller = match loaded {
        Ok(controller) => controller,
        Err(e) => {
            error!("Failed to load learning journey: {}", e);
            console.say(format!("🔒 {}", e.user_message()))?;
            return Ok(());
        }
    };

    if let Some(warning) = controller.warning() {
        console.say(format!("⚠ {}", warning))?;
    }
    render_current(&controller, console)?;
    console.say("Type `help` for commands.")?;

    let mut pending: PendingGeneration = None;

    loop {
        let notice_deadline = controller.cooldown_notice_deadline();
        let celebration_deadline = controller.celebration_deadline();

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("Journey view shutting down.");
                break;
            }
            joined = wait_for_generation(&mut pending), if pending.is_some() => {
                let Some((ticket, _)) = pending.take() else { continue };
                let result = joined.unwrap_or_else(|e| {
                    Err(PortError::Unexpected(format!("generation task failed: {}", e)))
                });
                match controller.finish_generation(ticket, result) {
                    Ok(_) => render_current(&controller, console)?,
                    Err(e) => {
                        console.say(e.user_message())?;
                        render_phase(&controller, console)?;
                    }
                }
            }
            _ = sleep_until(notice_deadline), if notice_deadline.is_some() => {
                controller.clear_expired();
                console.say("You can generate the next chapter now.")?;
            }
            _ = sleep_until(celebration_deadline), if celebration_deadline.is_some() => {
                controller.clear_expired();
            }
            line = console.next_line() => {
                let Some(line) = line? else { break };
                if line.is_empty() {
                    continue;
                }
                let flow = match line.parse::<JourneyCommand>() {
                    Ok(command) => {
                        handle_command(command, &mut controller, &mut pending, console, &shutdown).await?
                    }
                    Err(e) => {
                        console.say(e.to_string())?;
                        Flow::Continue
                    }
                };
                if flow == Flow::Quit {
                    break;
                }
            }
        }
    }

    if let Some((_, handle)) = pending.take() {
        handle.abort();
        info!("Discarded an in-flight chapter generation.");
    }
    Ok(())
}

async fn wait_for_generation(
    pending: &mut PendingGeneration,
) -> Result<PortResult<Chapter>, JoinError> {
    match pending {
        Some((_, handle)) => handle.await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn handle_command<I, W>(
    command: JourneyCommand,
    controller: &mut JourneyController,
    pending: &mut PendingGeneration,
    console: &mut Console<I, W>,
    shutdown: &CancellationToken,
) -> Result<Flow, ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    match command {
        JourneyCommand::Show => render_current(controller, console)?,
        JourneyCommand::List => render_list(controller, console)?,
        JourneyCommand::Go(number) => match controller.select(number - 1) {
            Ok(()) => render_current(controller, console)?,
            Err(e) => console.say(e.user_message())?,
        },
        JourneyCommand::Done | JourneyCommand::Undo => {
            let completed = command == JourneyCommand::Done;
            let index = controller.current_index();
            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Progress update for chapter {} abandoned on shutdown.", index + 1);
                    return Ok(Flow::Quit);
                }
                result = controller.set_completion(index, completed) => result,
            };
            match result {
                Ok(outcome) => {
                    let state = if outcome.completed { "completed" } else { "incomplete" };
                    console.say(format!("Chapter {} marked as {}.", index + 1, state))?;
                    if outcome.celebrating {
                        console.say(CELEBRATION_MESSAGE)?;
                    }
                }
                Err(e) => console.say(e.user_message())?,
            }
        }
        JourneyCommand::Next => {
            let current_done = controller
                .chapters()
                .get(controller.current_index())
                .is_some_and(|chapter| chapter.completed);
            if !current_done {
                console.say("Mark this chapter as completed before generating the next one.")?;
                return Ok(Flow::Continue);
            }
            match controller.begin_generation() {
                Ok(ticket) => {
                    console.say("⏳ Please wait, the chapter is being generated...")?;
                    let store = controller.store();
                    let request = ticket.request().clone();
                    let handle =
                        tokio::spawn(async move { store.generate_next_chapter(&request).await });
                    *pending = Some((ticket, handle));
                }
                Err(e) => console.say(e.user_message())?,
            }
        }
        JourneyCommand::Close => {
            if controller.is_celebrating() {
                controller.dismiss_celebration();
                console.say("Celebration closed.")?;
            } else {
                console.say("Nothing to close.")?;
            }
        }
        JourneyCommand::Help => console.say(JOURNEY_HELP)?,
        JourneyCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn render_current<I, W>(
    controller: &JourneyController,
    console: &mut Console<I, W>,
) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    if let Some(view) = controller.current_view() {
        render_chapter(&view, console)?;
    }
    render_phase(controller, console)?;
    if let Some(message) = controller.cooldown_message() {
        console.say(message)?;
    }
    if controller.is_celebrating() {
        console.say(CELEBRATION_MESSAGE)?;
    }
    Ok(())
}

fn render_phase<I, W>(
    controller: &JourneyController,
    console: &mut Console<I, W>,
) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    match controller.phase() {
        JourneyPhase::Viewing(_) => Ok(()),
        JourneyPhase::GeneratingNext { .. } => {
            Ok(console.say("⏳ Please wait, the chapter is being generated...")?)
        }
        JourneyPhase::GenerationFailed { at } => Ok(console.say(format!(
            "Generating the chapter after chapter {} failed. Type `next` to try again.",
            at + 1
        ))?),
    }
}

fn render_chapter<I, W>(view: &ChapterView, console: &mut Console<I, W>) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    console.say("")?;
    console.say(&view.heading)?;
    let Some(content) = &view.content else {
        console.say(format!("🔒 {}", LOCKED_CHAPTER_MESSAGE))?;
        return Ok(());
    };
    console.say(&content.description)?;
    console.say(format!("Topics: {}", view.topics))?;
    console.say("Script:")?;
    console.say(&content.script)?;
    console.say(format!("Summary: {}", content.summary))?;
    if !content.resources.is_empty() {
        console.say("Resources:")?;
        for resource in &content.resources {
            console.say(format!("  - {}", resource))?;
        }
    }
    if view.completed {
        console.say("[x] Completed (type `undo` to mark as incomplete)")?;
    } else {
        console.say("[ ] Not completed (type `done` to mark as completed)")?;
    }
    if view.offers_next {
        console.say("Type `next` to generate the next chapter.")?;
    }
    Ok(())
}

fn render_list<I, W>(controller: &JourneyController, console: &mut Console<I, W>) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    console.say("Chapters")?;
    for entry in controller.chapter_list() {
        let marker = if entry.current { ">" } else { " " };
        let check = if entry.completed { "x" } else { " " };
        console.say(format!("{} [{}] {}", marker, check, entry.heading))?;
        console.say(format!("      {}", entry.topics))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::console::scripted::{console, open_console, output, paced_console};
    use learning_journey_core::testing::{chapter, journey, FakeProgressStore};
    use std::time::Duration;

    fn cancel_after(delay: Duration) -> CancellationToken {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trigger.cancel();
        });
        token
    }

    /// First chapter done, view resumed at the second; generation returns "Fresh".
    fn store_ready_to_generate(generation_delay: Duration) -> Arc<FakeProgressStore> {
        let store = FakeProgressStore::with_journey("Python", journey(&[true, false, false]));
        store.set_generation_delay(generation_delay);
        let mut fresh = chapter(2, false);
        fresh.title = Some("Fresh".to_string());
        store.set_generated_chapter(fresh);
        Arc::new(store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_right_after_opening_reports_cooldown() {
        let store = Arc::new(FakeProgressStore::with_journey("Python", journey(&[false, false, false])));
        let mut console = console(&["done", "next", "quit"]);

        run_journey_view(store.clone(), "ada", "Python", &mut console, CancellationToken::new())
            .await
            .unwrap();

        let text = output(console);
        assert!(text.contains("Chapter 1 marked as completed."));
        assert!(text.contains("(60s remaining)"));
        assert!(store.chapter_requests().is_empty());
        assert_eq!(store.updates().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_after_cooldown_opens_new_chapter() {
        let store = Arc::new(FakeProgressStore::with_journey("Python", journey(&[false, false, false])));
        let mut console = paced_console(&["done", "next", "show", "quit"], Duration::from_secs(61));

        run_journey_view(store.clone(), "ada", "Python", &mut console, CancellationToken::new())
            .await
            .unwrap();

        let text = output(console);
        assert_eq!(store.chapter_requests().len(), 1);
        assert!(text.contains("Please wait, the chapter is being generated"));
        assert!(text.contains("Chapter 2: Chapter title 2"));
        assert!(text.contains("Script for chapter 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_requires_completed_chapter() {
        let store = Arc::new(FakeProgressStore::with_journey("Python", journey(&[false, false])));
        let mut console = console(&["next"]);

        run_journey_view(store.clone(), "ada", "Python", &mut console, CancellationToken::new())
            .await
            .unwrap();

        assert!(output(console).contains("Mark this chapter as completed"));
        assert!(store.chapter_requests().is_empty());
    }

    #[tokio::test]
    async fn test_locked_chapter_shows_placeholder() {
        let store = Arc::new(FakeProgressStore::with_journey("Python", journey(&[false, false])));
        let mut console = console(&["go 2", "go 7", "list"]);

        run_journey_view(store.clone(), "ada", "Python", &mut console, CancellationToken::new())
            .await
            .unwrap();

        let text = output(console);
        assert!(text.contains(LOCKED_CHAPTER_MESSAGE));
        assert!(text.contains("Chapter 7 does not exist (2 chapters)."));
        assert!(text.contains("> [ ] Chapter 2: Chapter title 2"));
    }

    #[tokio::test]
    async fn test_missing_journey_is_reported() {
        let store = Arc::new(FakeProgressStore::default());
        let mut console = console(&[]);

        run_journey_view(store.clone(), "ada", "Rust", &mut console, CancellationToken::new())
            .await
            .unwrap();

        assert!(output(console).contains("🔒 No learning journey found for this skill."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_chapter_celebrates() {
        let mut flags = vec![true; 9];
        flags.push(false);
        let store = Arc::new(FakeProgressStore::with_journey("Python", journey(&flags)));
        let mut console = console(&["done", "close", "close"]);

        run_journey_view(store.clone(), "ada", "Python", &mut console, CancellationToken::new())
            .await
            .unwrap();

        let text = output(console);
        assert!(text.contains(CELEBRATION_MESSAGE));
        assert!(text.contains("Celebration closed."));
        assert!(text.contains("Nothing to close."));
    }

    #[tokio::test]
    async fn test_shutdown_stops_before_loading() {
        let store = Arc::new(FakeProgressStore::with_journey("Python", journey(&[false])));
        let mut console = console(&["show"]);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        run_journey_view(store.clone(), "ada", "Python", &mut console, shutdown)
            .await
            .unwrap();

        assert_eq!(store.user_data_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_slow_progress_update() {
        let store = Arc::new(FakeProgressStore::with_journey("Python", journey(&[false, false])));
        store.set_update_delay(Duration::from_secs(3600));
        let mut console = open_console(&["done"]);
        let started = Instant::now();

        run_journey_view(store.clone(), "ada", "Python", &mut console, cancel_after(Duration::from_secs(1)))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(store.updates().len(), 1);
        assert!(!output(console).contains("marked as completed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_in_flight_generation() {
        let store = store_ready_to_generate(Duration::from_secs(100));
        let mut console = paced_console(&["go 1", "next", "show"], Duration::from_secs(61));
        let started = Instant::now();

        // The generation starts at 122s and would answer at 222s.
        run_journey_view(store.clone(), "ada", "Python", &mut console, cancel_after(Duration::from_secs(130)))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(131));
        assert_eq!(store.chapter_requests().len(), 1);
        let text = output(console);
        assert!(text.contains("Please wait, the chapter is being generated"));
        assert!(!text.contains("Fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_next_while_generating_is_refused() {
        let store = store_ready_to_generate(Duration::from_secs(100));
        let mut console =
            paced_console(&["go 1", "next", "next", "quit"], Duration::from_secs(61));

        run_journey_view(store.clone(), "ada", "Python", &mut console, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(store.chapter_requests().len(), 1);
        let text = output(console);
        assert_eq!(text.matches("Please wait, the chapter is being generated").count(), 2);
        assert!(text.contains("Chapter 2: Fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_notice_clears_itself() {
        let store = store_ready_to_generate(Duration::ZERO);
        let mut console = open_console(&["go 1", "next"]);

        run_journey_view(store.clone(), "ada", "Python", &mut console, cancel_after(Duration::from_secs(90)))
            .await
            .unwrap();

        let text = output(console);
        let notice = text.find("(60s remaining)").unwrap();
        let cleared = text.find("You can generate the next chapter now.").unwrap();
        assert!(notice < cleared);
        assert!(store.chapter_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_generation_offers_retry() {
        let store = store_ready_to_generate(Duration::ZERO);
        store.set_fail_generation(true);
        let mut console = paced_console(&["go 1", "next", "quit"], Duration::from_secs(61));

        run_journey_view(store.clone(), "ada", "Python", &mut console, CancellationToken::new())
            .await
            .unwrap();

        let text = output(console);
        assert!(text.contains("Failed to generate next chapter. Please try again later."));
        assert!(text.contains("Generating the chapter after chapter 1 failed. Type `next` to try again."));
    }
}
