//! crates/learning_journey_core/src/testing.rs
//!
//! In-memory stand-ins for the ports, used by this crate's tests and by the
//! client's tests through the `testing` feature.

use crate::domain::{
    Chapter, ChapterRequest, Journey, ProgressUpdate, QuizEligibility, QuizQuestion,
    ScoreSubmission, SkillRecord, UserData,
};
use crate::ports::{PortError, PortResult, ProgressStore, UsernameStore};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Builds a chapter with a script, the way the backend returns generated chapters.
pub fn chapter(number: u32, completed: bool) -> Chapter {
    Chapter {
        number: Some(number),
        title: Some(format!("Chapter title {number}")),
        description: Some(format!("About chapter {number}")),
        topics: vec!["Basics".to_string(), format!("Topic {number}")],
        resources: Vec::new(),
        script: Some(format!("Script for chapter {number}")),
        summary: Some(format!("Summary {number}")),
        completed,
    }
}

/// Builds a journey whose completion flags follow `completed`.
pub fn journey(completed: &[bool]) -> Journey {
    Journey {
        level: Some("Beginner".to_string()),
        chapters: completed
            .iter()
            .enumerate()
            .map(|(i, done)| chapter(i as u32 + 1, *done))
            .collect(),
    }
}

pub fn skill_record(skill: &str, journey: Option<Journey>) -> SkillRecord {
    SkillRecord {
        skill: skill.to_string(),
        score: 12,
        progress: 0.0,
        last_attempt_date: None,
        learning_journey: journey,
    }
}

#[derive(Default)]
struct FakeState {
    user_data: UserData,
    questions: Vec<QuizQuestion>,
    taken_usernames: Vec<String>,
    eligibility: Option<QuizEligibility>,
    skills: Vec<String>,
    fail_updates: bool,
    fail_generation: bool,
    generated: Option<Chapter>,
    update_delay: Duration,
    generation_delay: Duration,
    updates: Vec<ProgressUpdate>,
    chapter_requests: Vec<ChapterRequest>,
    submissions: Vec<ScoreSubmission>,
    user_data_calls: usize,
}

/// A `ProgressStore` that answers from memory and records every mutation.
#[derive(Default)]
pub struct FakeProgressStore {
    state: Mutex<FakeState>,
}

impl FakeProgressStore {
    pub fn with_user_data(user_data: UserData) -> Self {
        let store = Self::default();
        store.lock().user_data = user_data;
        store
    }

    /// A store holding a single skill with the given journey.
    pub fn with_journey(skill: &str, journey: Journey) -> Self {
        Self::with_user_data(UserData {
            skills: vec![skill_record(skill, Some(journey))],
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_questions(&self, questions: Vec<QuizQuestion>) {
        self.lock().questions = questions;
    }

    pub fn set_taken_usernames(&self, names: &[&str]) {
        self.lock().taken_usernames = names.iter().map(|n| n.to_string()).collect();
    }

    pub fn set_eligibility(&self, eligibility: QuizEligibility) {
        self.lock().eligibility = Some(eligibility);
    }

    pub fn set_available_skills(&self, skills: &[&str]) {
        self.lock().skills = skills.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.lock().fail_updates = fail;
    }

    pub fn set_fail_generation(&self, fail: bool) {
        self.lock().fail_generation = fail;
    }

    /// Makes every progress update take `delay` before answering.
    pub fn set_update_delay(&self, delay: Duration) {
        self.lock().update_delay = delay;
    }

    /// Makes every chapter generation take `delay` before answering.
    pub fn set_generation_delay(&self, delay: Duration) {
        self.lock().generation_delay = delay;
    }

    /// Overrides the chapter returned by the next generation calls.
    pub fn set_generated_chapter(&self, chapter: Chapter) {
        self.lock().generated = Some(chapter);
    }

    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.lock().updates.clone()
    }

    pub fn chapter_requests(&self) -> Vec<ChapterRequest> {
        self.lock().chapter_requests.clone()
    }

    pub fn submissions(&self) -> Vec<ScoreSubmission> {
        self.lock().submissions.clone()
    }

    pub fn user_data_calls(&self) -> usize {
        self.lock().user_data_calls
    }
}

#[async_trait]
impl ProgressStore for FakeProgressStore {
    async fn get_user_data(&self, _username: &str) -> PortResult<UserData> {
        let mut state = self.lock();
        state.user_data_calls += 1;
        Ok(state.user_data.clone())
    }

    async fn update_progress(&self, update: &ProgressUpdate) -> PortResult<()> {
        let (delay, fail) = {
            let mut state = self.lock();
            state.updates.push(update.clone());
            (state.update_delay, state.fail_updates)
        };
        tokio::time::sleep(delay).await;
        if fail {
            return Err(PortError::Unexpected("update rejected".to_string()));
        }
        Ok(())
    }

    async fn generate_next_chapter(&self, request: &ChapterRequest) -> PortResult<Chapter> {
        let (delay, fail, generated) = {
            let mut state = self.lock();
            state.chapter_requests.push(request.clone());
            (state.generation_delay, state.fail_generation, state.generated.clone())
        };
        tokio::time::sleep(delay).await;
        if fail {
            return Err(PortError::Unexpected("generation failed".to_string()));
        }
        let next = request.current_chapter as u32 + 2;
        Ok(generated.unwrap_or_else(|| chapter(next, false)))
    }

    async fn get_questions(&self, _skill: &str) -> PortResult<Vec<QuizQuestion>> {
        Ok(self.lock().questions.clone())
    }

    async fn submit_score(&self, submission: &ScoreSubmission) -> PortResult<()> {
        self.lock().submissions.push(submission.clone());
        Ok(())
    }

    async fn can_take_quiz(&self, _username: &str, _skill: &str) -> PortResult<QuizEligibility> {
        Ok(self.lock().eligibility.clone().unwrap_or(QuizEligibility {
            can_take: true,
            message: None,
        }))
    }

    async fn available_skills(&self) -> PortResult<Vec<String>> {
        Ok(self.lock().skills.clone())
    }

    async fn check_username(&self, username: &str) -> PortResult<bool> {
        let wanted = username.to_lowercase();
        Ok(self
            .lock()
            .taken_usernames
            .iter()
            .any(|name| name.to_lowercase() == wanted))
    }
}

/// A `UsernameStore` backed by a single in-memory slot.
#[derive(Default)]
pub struct MemoryUsernameStore {
    slot: Mutex<Option<String>>,
}

impl MemoryUsernameStore {
    pub fn with_username(username: &str) -> Self {
        Self {
            slot: Mutex::new(Some(username.to_string())),
        }
    }
}

impl UsernameStore for MemoryUsernameStore {
    fn load(&self) -> PortResult<Option<String>> {
        Ok(self
            .slot
            .lock()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .clone())
    }

    fn save(&self, username: &str) -> PortResult<()> {
        *self
            .slot
            .lock()
            .map_err(|e| PortError::Unexpected(e.to_string()))? = Some(username.to_string());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        *self
            .slot
            .lock()
            .map_err(|e| PortError::Unexpected(e.to_string()))? = None;
        Ok(())
    }
}
