//! crates/learning_journey_core/src/dashboard.rs
//!
//! Aggregated per-skill progress for the dashboard and profile views.

use crate::domain::{SkillRecord, UserData, QUIZ_MAX_SCORE};
use chrono::NaiveDate;

pub const EMPTY_DASHBOARD_MESSAGE: &str =
    "No skills data available. Start learning to see your progress!";

#[derive(Debug, Clone, PartialEq)]
pub struct SkillSummary {
    pub skill: String,
    pub score: u32,
    pub max_score: u32,
    pub progress_percent: f64,
    pub chapters_completed: usize,
    pub chapters_total: usize,
    pub last_attempt_date: Option<NaiveDate>,
}

impl SkillSummary {
    pub fn from_record(record: &SkillRecord) -> Self {
        let (chapters_completed, chapters_total) = record
            .learning_journey
            .as_ref()
            .map(|journey| (journey.completed_count(), journey.chapters.len()))
            .unwrap_or((0, 0));
        Self {
            skill: record.skill.clone(),
            score: record.score,
            max_score: QUIZ_MAX_SCORE,
            progress_percent: record.progress.clamp(0.0, 100.0),
            chapters_completed,
            chapters_total,
            last_attempt_date: record.last_attempt_date,
        }
    }

    pub fn progress_label(&self) -> String {
        format!("{:.1}%", self.progress_percent)
    }

    pub fn score_label(&self) -> String {
        format!("{}/{}", self.score, self.max_score)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub username: String,
    pub skills: Vec<SkillSummary>,
}

impl Dashboard {
    pub fn from_user_data(username: &str, data: &UserData) -> Self {
        Self {
            username: username.to_string(),
            skills: data.skills.iter().map(SkillSummary::from_record).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Mean progress across skills, or `None` with no skills.
    pub fn average_progress(&self) -> Option<f64> {
        if self.skills.is_empty() {
            return None;
        }
        let total: f64 = self.skills.iter().map(|s| s.progress_percent).sum();
        Some(total / self.skills.len() as f64)
    }
}
