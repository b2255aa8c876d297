//! crates/learning_journey_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of the HTTP transport or any serialization format.

use chrono::NaiveDate;

/// The chapter whose completion finishes a course and triggers the celebration.
pub const CELEBRATION_CHAPTER_INDEX: usize = 9;

/// Quizzes are scored out of this many points by the backend's level rules.
pub const QUIZ_MAX_SCORE: u32 = 20;

/// Marker the backend writes into every script of a fallback journey.
pub const PLACEHOLDER_SCRIPT_MARKER: &str = "This is a placeholder script due to API failure";

/// One unit of learning content within a journey.
///
/// Everything except `completed` is opaque text produced by the backend and may
/// be missing; the presentation layer substitutes fallback text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chapter {
    /// The backend's 1-based chapter number, when it sent one.
    pub number: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub resources: Vec<String>,
    pub script: Option<String>,
    pub summary: Option<String>,
    pub completed: bool,
}

impl Chapter {
    /// True when the chapter carries a non-empty script.
    pub fn has_script(&self) -> bool {
        self.script.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// The number shown to the user, falling back to the position in the journey.
    pub fn display_number(&self, index: usize) -> u32 {
        self.number.unwrap_or(index as u32 + 1)
    }
}

/// The ordered chapters generated for a user for one skill.
///
/// Insertion order is presentation order and unlock order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journey {
    pub level: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl Journey {
    /// Index of the first incomplete chapter, or the last chapter when all are done.
    ///
    /// Returns `None` for an empty journey.
    pub fn resume_index(&self) -> Option<usize> {
        if self.chapters.is_empty() {
            return None;
        }
        Some(
            self.chapters
                .iter()
                .position(|chapter| !chapter.completed)
                .unwrap_or(self.chapters.len() - 1),
        )
    }

    pub fn completed_count(&self) -> usize {
        self.chapters.iter().filter(|chapter| chapter.completed).count()
    }

    /// Whether the backend fell back to its placeholder journey.
    pub fn is_placeholder(&self) -> bool {
        self.chapters.iter().any(|chapter| {
            chapter
                .script
                .as_deref()
                .is_some_and(|script| script.contains(PLACEHOLDER_SCRIPT_MARKER))
        })
    }
}

/// A user's standing in one skill, as held by the Progress Store.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillRecord {
    pub skill: String,
    pub score: u32,
    /// Percentage of completed chapters, 0 to 100.
    pub progress: f64,
    pub last_attempt_date: Option<NaiveDate>,
    pub learning_journey: Option<Journey>,
}

/// Everything the Progress Store knows about a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserData {
    pub skills: Vec<SkillRecord>,
}

impl UserData {
    /// Finds a skill by name, ignoring case.
    pub fn find_skill(&self, skill: &str) -> Option<&SkillRecord> {
        let wanted = skill.to_lowercase();
        self.skills
            .iter()
            .find(|record| record.skill.to_lowercase() == wanted)
    }
}

/// A multiple-choice quiz question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub kind: Option<String>,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub skill: Option<String>,
}

/// Whether the backend will accept another quiz attempt today.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizEligibility {
    pub can_take: bool,
    pub message: Option<String>,
}

// The request payloads below mirror the Progress Store's mutation inputs.

/// A finished quiz, used by the Progress Store to seed the learning journey.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub username: String,
    pub skill: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub username: String,
    pub skill: String,
    pub chapter_index: usize,
    pub completed: bool,
}

/// Asks the store to synthesize the chapter after `current_chapter`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterRequest {
    pub username: String,
    pub skill: String,
    pub current_chapter: usize,
}
