//! crates/learning_journey_core/src/journey.rs
//!
//! The Journey Controller: owns one user's journey for one skill, derives which
//! chapter is visible and unlocked, and mediates every mutating call to the
//! Progress Store.
//!
//! Chapter generation is rate limited per controller instance. The cooldown
//! baseline is set when the journey loads, so a generation request issued right
//! after opening the view is still paced.

use crate::domain::{Chapter, ChapterRequest, Journey, ProgressUpdate, CELEBRATION_CHAPTER_INDEX};
use crate::ports::{PortError, PortResult, ProgressStore};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Minimum time between two chapter generations.
pub const GENERATION_COOLDOWN: Duration = Duration::from_secs(60);

/// How long the course-completion celebration stays up unless dismissed.
pub const CELEBRATION_DURATION: Duration = Duration::from_secs(5);

pub const LOCKED_CHAPTER_MESSAGE: &str = "Complete the previous chapters to unlock this.";
pub const PLACEHOLDER_JOURNEY_WARNING: &str =
    "Failed to generate a learning journey due to API issues. Displaying a placeholder journey.";

static MARKDOWN_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\*\*|#|""#).expect("markdown noise pattern is valid"));

//=========================================================================================
// Errors
//=========================================================================================

/// The Progress Store call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Load,
    UpdateProgress,
    GenerateChapter,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOperation::Load => "load journey",
            StoreOperation::UpdateProgress => "update progress",
            StoreOperation::GenerateChapter => "generate next chapter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JourneyError {
    #[error("username and skill are both required")]
    MissingInput,

    #[error("no learning journey found for skill '{0}'")]
    NotFound(String),

    /// Local precondition failure; no request was sent.
    #[error("chapter generation is cooling down, {remaining:?} remaining")]
    CooldownActive { remaining: Duration },

    #[error("no more chapters to generate")]
    NoMoreChapters,

    #[error("a chapter is already being generated")]
    GenerationInFlight,

    #[error("chapter index {index} is out of bounds for {len} chapters")]
    InvalidChapter { index: usize, len: usize },

    #[error("failed to {operation}: {source}")]
    Network {
        operation: StoreOperation,
        #[source]
        source: PortError,
    },
}

impl JourneyError {
    /// The message shown to the user. Every controller error ends up here.
    pub fn user_message(&self) -> String {
        match self {
            JourneyError::MissingInput => "User or skill not specified.".to_string(),
            JourneyError::NotFound(_) => "No learning journey found for this skill.".to_string(),
            JourneyError::CooldownActive { remaining } => cooldown_message(*remaining),
            JourneyError::NoMoreChapters => "No more chapters to generate.".to_string(),
            JourneyError::GenerationInFlight => {
                "Please wait, the chapter is being generated...".to_string()
            }
            JourneyError::InvalidChapter { index, len } => {
                format!("Chapter {} does not exist ({} chapters).", index + 1, len)
            }
            JourneyError::Network { operation, .. } => match operation {
                StoreOperation::Load => {
                    "Failed to load learning journey. Please try again.".to_string()
                }
                StoreOperation::UpdateProgress => {
                    "Failed to update progress. Please try again.".to_string()
                }
                StoreOperation::GenerateChapter => {
                    "Failed to generate next chapter. Please try again later.".to_string()
                }
            },
        }
    }

}

fn cooldown_message(remaining: Duration) -> String {
    let secs = remaining.as_millis().div_ceil(1000);
    format!(
        "Can be generated only after a minute. Read this chapter first. ({}s remaining)",
        secs
    )
}

//=========================================================================================
// Unlock Predicates
//=========================================================================================

/// A chapter may be shown when it is the first one or its predecessor is completed.
pub fn can_show(chapters: &[Chapter], index: usize) -> bool {
    index == 0
        || chapters
            .get(index - 1)
            .is_some_and(|previous| previous.completed)
}

/// A chapter is unlocked when it is the first one or the backend has written its script.
pub fn is_unlocked(chapters: &[Chapter], index: usize) -> bool {
    index == 0 || chapters.get(index).is_some_and(Chapter::has_script)
}

/// The first chapter's script often arrives as raw markdown.
fn display_script(index: usize, script: &str) -> String {
    if index == 0 {
        MARKDOWN_NOISE.replace_all(script, "").trim().to_string()
    } else {
        script.to_string()
    }
}

fn topics_line(chapter: &Chapter) -> String {
    if chapter.topics.is_empty() {
        "Topic A, Topic B, Topic C".to_string()
    } else {
        chapter.topics.join(", ")
    }
}

fn heading(chapter: &Chapter, index: usize) -> String {
    format!(
        "Chapter {}: {}",
        chapter.display_number(index),
        chapter.title.as_deref().unwrap_or("Untitled")
    )
}

//=========================================================================================
// Views
//=========================================================================================

/// Everything needed to render one chapter, with the locking rules applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterView {
    pub index: usize,
    pub heading: String,
    pub topics: String,
    pub completed: bool,
    pub can_show: bool,
    pub unlocked: bool,
    /// Description, script and summary; `None` while the chapter is locked.
    pub content: Option<ChapterContent>,
    /// The "generate next chapter" action is offered for this chapter.
    pub offers_next: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterContent {
    pub description: String,
    pub script: String,
    pub summary: String,
    pub resources: Vec<String>,
}

/// One line of the chapter list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterListEntry {
    pub index: usize,
    pub heading: String,
    pub topics: String,
    pub completed: bool,
    pub current: bool,
}

/// Where the controller is in its view/generate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyPhase {
    Viewing(usize),
    GeneratingNext { from: usize },
    GenerationFailed { at: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Generation {
    Idle,
    InFlight { from: usize },
    Failed { at: usize },
}

/// Shown after a generation request hit the cooldown; clears by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CooldownNotice {
    remaining: Duration,
    clears_at: Instant,
}

/// Result of a successful completion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub index: usize,
    pub completed: bool,
    /// The course-completion celebration started with this call.
    pub celebrating: bool,
}

/// An accepted generation request that still has to be sent to the store.
///
/// Obtained from [`JourneyController::begin_generation`] and handed back to
/// [`JourneyController::finish_generation`] with the store's answer.
#[derive(Debug)]
pub struct GenerationTicket {
    request: ChapterRequest,
    target: usize,
    started_at: Instant,
}

impl GenerationTicket {
    pub fn request(&self) -> &ChapterRequest {
        &self.request
    }

    /// The index the generated chapter will be written to.
    pub fn target(&self) -> usize {
        self.target
    }
}

//=========================================================================================
// JourneyController
//=========================================================================================

pub struct JourneyController {
    store: Arc<dyn ProgressStore>,
    username: String,
    skill: String,
    journey: Journey,
    current: usize,
    generation: Generation,
    last_generated: Instant,
    cooldown_notice: Option<CooldownNotice>,
    celebration_until: Option<Instant>,
}

impl JourneyController {
    /// Fetches the user's skills and opens the journey for `skill`.
    ///
    /// The skill name is matched case-insensitively. The cooldown baseline is
    /// set to the moment loading finished.
    pub async fn load(
        store: Arc<dyn ProgressStore>,
        username: &str,
        skill: &str,
    ) -> Result<Self, JourneyError> {
        let username = username.trim();
        let skill = skill.trim();
        if username.is_empty() || skill.is_empty() {
            return Err(JourneyError::MissingInput);
        }

        info!("Loading learning journey for user '{}', skill '{}'", username, skill);
        let user_data = store.get_user_data(username).await.map_err(|e| match e {
            PortError::NotFound(_) => JourneyError::NotFound(skill.to_string()),
            source => JourneyError::Network {
                operation: StoreOperation::Load,
                source,
            },
        })?;

        let journey = user_data
            .find_skill(skill)
            .and_then(|record| record.learning_journey.clone())
            .ok_or_else(|| JourneyError::NotFound(skill.to_string()))?;
        let current = journey
            .resume_index()
            .ok_or_else(|| JourneyError::NotFound(skill.to_string()))?;

        debug!(
            "Journey loaded with {} chapters, {} completed, resuming at {}",
            journey.chapters.len(),
            journey.completed_count(),
            current
        );

        Ok(Self {
            store,
            username: username.to_string(),
            skill: skill.to_string(),
            journey,
            current,
            generation: Generation::Idle,
            last_generated: Instant::now(),
            cooldown_notice: None,
            celebration_until: None,
        })
    }

    // --- Accessors ---

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn skill(&self) -> &str {
        &self.skill
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.journey.chapters
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// When the cooldown window last restarted.
    pub fn last_generated(&self) -> Instant {
        self.last_generated
    }

    /// A shared handle to the store, for sending a ticket's request off the controller.
    pub fn store(&self) -> Arc<dyn ProgressStore> {
        Arc::clone(&self.store)
    }

    pub fn phase(&self) -> JourneyPhase {
        match self.generation {
            Generation::Idle => JourneyPhase::Viewing(self.current),
            Generation::InFlight { from } => JourneyPhase::GeneratingNext { from },
            Generation::Failed { at } => JourneyPhase::GenerationFailed { at },
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.generation, Generation::InFlight { .. })
    }

    /// A warning to show alongside the journey, e.g. when the backend fell back
    /// to its placeholder content.
    pub fn warning(&self) -> Option<&'static str> {
        self.journey
            .is_placeholder()
            .then_some(PLACEHOLDER_JOURNEY_WARNING)
    }

    // --- Derived views ---

    pub fn can_show(&self, index: usize) -> bool {
        can_show(&self.journey.chapters, index)
    }

    pub fn is_unlocked(&self, index: usize) -> bool {
        is_unlocked(&self.journey.chapters, index)
    }

    pub fn chapter_view(&self, index: usize) -> Option<ChapterView> {
        let chapters = &self.journey.chapters;
        let chapter = chapters.get(index)?;
        let can_show = can_show(chapters, index);
        let unlocked = is_unlocked(chapters, index);

        let content = (can_show && unlocked).then(|| ChapterContent {
            description: chapter
                .description
                .clone()
                .unwrap_or_else(|| "No description available.".to_string()),
            script: chapter
                .script
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| display_script(index, s))
                .unwrap_or_else(|| "No script available.".to_string()),
            summary: chapter
                .summary
                .clone()
                .unwrap_or_else(|| "No summary available.".to_string()),
            resources: chapter.resources.clone(),
        });

        Some(ChapterView {
            index,
            heading: heading(chapter, index),
            topics: topics_line(chapter),
            completed: chapter.completed,
            can_show,
            unlocked,
            offers_next: content.is_some() && chapter.completed && index + 1 < chapters.len(),
            content,
        })
    }

    pub fn current_view(&self) -> Option<ChapterView> {
        self.chapter_view(self.current)
    }

    pub fn chapter_list(&self) -> Vec<ChapterListEntry> {
        self.journey
            .chapters
            .iter()
            .enumerate()
            .map(|(index, chapter)| ChapterListEntry {
                index,
                heading: heading(chapter, index),
                topics: topics_line(chapter),
                completed: chapter.completed,
                current: index == self.current,
            })
            .collect()
    }

    // --- Navigation ---

    /// Moves the visible chapter. Locked chapters can be selected; their
    /// content stays hidden.
    pub fn select(&mut self, index: usize) -> Result<(), JourneyError> {
        self.check_index(index)?;
        self.current = index;
        self.clear_failed_generation();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), JourneyError> {
        let len = self.journey.chapters.len();
        if index >= len {
            return Err(JourneyError::InvalidChapter { index, len });
        }
        Ok(())
    }

    fn clear_failed_generation(&mut self) {
        if let Generation::Failed { .. } = self.generation {
            self.generation = Generation::Idle;
        }
    }

    // --- Completion ---

    /// Marks a chapter complete or incomplete.
    ///
    /// The local flag changes before the store is asked and is kept even if the
    /// store rejects the update.
    pub async fn set_completion(
        &mut self,
        index: usize,
        completed: bool,
    ) -> Result<CompletionOutcome, JourneyError> {
        self.check_index(index)?;
        self.clear_failed_generation();
        let was_completed = self.journey.chapters[index].completed;
        self.journey.chapters[index].completed = completed;

        let update = ProgressUpdate {
            username: self.username.clone(),
            skill: self.skill.clone(),
            chapter_index: index,
            completed,
        };
        if let Err(source) = self.store.update_progress(&update).await {
            warn!("Progress update for chapter {} failed: {}", index, source);
            return Err(JourneyError::Network {
                operation: StoreOperation::UpdateProgress,
                source,
            });
        }
        info!("Chapter {} marked completed={}", index, completed);

        let celebrating = index == CELEBRATION_CHAPTER_INDEX && completed && !was_completed;
        if celebrating {
            self.celebration_until = Some(Instant::now() + CELEBRATION_DURATION);
            info!("Final chapter completed for skill '{}'", self.skill);
        }

        Ok(CompletionOutcome {
            index,
            completed,
            celebrating,
        })
    }

    /// Toggles the completion flag of the visible chapter.
    pub async fn toggle_current(&mut self) -> Result<CompletionOutcome, JourneyError> {
        let index = self.current;
        let completed = !self.journey.chapters[index].completed;
        self.set_completion(index, completed).await
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// When the running celebration ends by itself.
    pub fn celebration_deadline(&self) -> Option<Instant> {
        self.celebration_until
    }

    pub fn dismiss_celebration(&mut self) {
        self.celebration_until = None;
    }

    // --- Generation ---

    /// Checks every precondition for generating the chapter after the visible
    /// one and marks a generation as in flight.
    ///
    /// No request is sent here. A rejected call leaves the controller untouched
    /// apart from the cooldown notice.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, JourneyError> {
        if self.is_generating() {
            return Err(JourneyError::GenerationInFlight);
        }

        let target = self.current + 1;
        if target >= self.journey.chapters.len() {
            return Err(JourneyError::NoMoreChapters);
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_generated);
        if elapsed < GENERATION_COOLDOWN {
            let remaining = GENERATION_COOLDOWN - elapsed;
            self.cooldown_notice = Some(CooldownNotice {
                remaining,
                clears_at: now + remaining,
            });
            debug!("Generation rejected, {:?} of cooldown left", remaining);
            return Err(JourneyError::CooldownActive { remaining });
        }

        self.generation = Generation::InFlight { from: self.current };
        Ok(GenerationTicket {
            request: ChapterRequest {
                username: self.username.clone(),
                skill: self.skill.clone(),
                current_chapter: self.current,
            },
            target,
            started_at: now,
        })
    }

    /// Applies the store's answer to an accepted generation request.
    ///
    /// On success the chapter is written at the ticket's target, the view moves
    /// there and the cooldown restarts from when the request was accepted. On
    /// failure nothing but the phase changes.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: PortResult<Chapter>,
    ) -> Result<usize, JourneyError> {
        match result {
            Ok(chapter) => {
                let target = ticket.target;
                match self.journey.chapters.get_mut(target) {
                    Some(slot) => *slot = chapter,
                    None => self.journey.chapters.push(chapter),
                }
                self.current = target;
                self.last_generated = ticket.started_at;
                self.cooldown_notice = None;
                self.generation = Generation::Idle;
                info!("Generated chapter {} for skill '{}'", target + 1, self.skill);
                Ok(target)
            }
            Err(source) => {
                warn!("Chapter generation failed: {}", source);
                self.generation = Generation::Failed {
                    at: ticket.request.current_chapter,
                };
                Err(JourneyError::Network {
                    operation: StoreOperation::GenerateChapter,
                    source,
                })
            }
        }
    }

    /// Generates the chapter after the visible one and moves to it.
    pub async fn generate_next(&mut self) -> Result<usize, JourneyError> {
        let ticket = self.begin_generation()?;
        let result = self.store.generate_next_chapter(ticket.request()).await;
        self.finish_generation(ticket, result)
    }

    /// The cooldown message, while it has not cleared yet.
    pub fn cooldown_message(&self) -> Option<String> {
        self.cooldown_notice
            .filter(|notice| Instant::now() < notice.clears_at)
            .map(|notice| cooldown_message(notice.remaining))
    }

    /// When the pending cooldown message clears.
    pub fn cooldown_notice_deadline(&self) -> Option<Instant> {
        self.cooldown_notice.map(|notice| notice.clears_at)
    }

    /// Drops the cooldown notice and celebration once their time is up.
    pub fn clear_expired(&mut self) {
        let now = Instant::now();
        if self.cooldown_notice.is_some_and(|n| n.clears_at <= now) {
            self.cooldown_notice = None;
        }
        if self.celebration_until.is_some_and(|until| until <= now) {
            self.celebration_until = None;
        }
    }
}
