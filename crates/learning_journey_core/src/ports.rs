//! crates/learning_journey_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP backend and of where the username is kept.

use async_trait::async_trait;
use crate::domain::{
    Chapter, ChapterRequest, ProgressUpdate, QuizEligibility, QuizQuestion, ScoreSubmission,
    UserData,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (HTTP, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote service of record for journeys, scores and completion state.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    // --- Journeys ---
    async fn get_user_data(&self, username: &str) -> PortResult<UserData>;

    async fn update_progress(&self, update: &ProgressUpdate) -> PortResult<()>;

    /// Synthesizes the chapter following `request.current_chapter`.
    async fn generate_next_chapter(&self, request: &ChapterRequest) -> PortResult<Chapter>;

    // --- Quizzes ---
    async fn get_questions(&self, skill: &str) -> PortResult<Vec<QuizQuestion>>;

    async fn submit_score(&self, submission: &ScoreSubmission) -> PortResult<()>;

    async fn can_take_quiz(&self, username: &str, skill: &str) -> PortResult<QuizEligibility>;

    async fn available_skills(&self) -> PortResult<Vec<String>>;

    // --- Usernames ---
    /// Returns true when the username is already taken.
    async fn check_username(&self, username: &str) -> PortResult<bool>;
}

/// Durable local storage for the chosen username.
pub trait UsernameStore: Send + Sync {
    fn load(&self) -> PortResult<Option<String>>;

    fn save(&self, username: &str) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}
