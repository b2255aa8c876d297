//! services/client/src/adapters/http_store.rs
//!
//! This module contains the Progress Store adapter, which is the concrete
//! implementation of the `ProgressStore` port from the `core` crate. It talks
//! to the backend's JSON-over-HTTP API using `reqwest`.

use async_trait::async_trait;
use chrono::NaiveDate;
use learning_journey_core::domain::{
    Chapter, ChapterRequest, Journey, ProgressUpdate, QuizEligibility, QuizQuestion,
    ScoreSubmission, SkillRecord, UserData,
};
use learning_journey_core::ports::{PortError, PortResult, ProgressStore};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ProgressStore` port over HTTP.
#[derive(Clone)]
pub struct HttpProgressStore {
    client: Client,
    base_url: Url,
}

impl HttpProgressStore {
    /// Creates a new `HttpProgressStore` for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PortError::Unexpected(format!("Invalid store URL '{}': {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> PortResult<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        decode(response).await
    }

    async fn post_json<B: Serialize + Sync>(&self, url: Url, body: &B) -> PortResult<()> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        check_status(response).await.map(|_| ())
    }
}

/// Maps non-success statuses onto port errors, preferring the backend's `detail`.
async fn check_status(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);
    Err(match status {
        StatusCode::NOT_FOUND => PortError::NotFound(detail),
        _ => PortError::Unexpected(format!("API error ({}): {}", status, detail)),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| PortError::Unexpected(format!("Malformed response: {}", e)))
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Deserialize)]
struct UserDataRecord {
    #[serde(default)]
    skills: Vec<SkillDto>,
}
impl UserDataRecord {
    fn to_domain(self) -> UserData {
        UserData {
            skills: self.skills.into_iter().map(SkillDto::to_domain).collect(),
        }
    }
}

#[derive(Deserialize)]
struct SkillDto {
    skill: String,
    #[serde(default)]
    score: Option<u32>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    last_attempt_date: Option<NaiveDate>,
    #[serde(default)]
    learning_journey: Option<JourneyDto>,
}
impl SkillDto {
    fn to_domain(self) -> SkillRecord {
        SkillRecord {
            skill: self.skill,
            score: self.score.unwrap_or(0),
            progress: self.progress.unwrap_or(0.0),
            last_attempt_date: self.last_attempt_date,
            learning_journey: self.learning_journey.map(JourneyDto::to_domain),
        }
    }
}

#[derive(Deserialize)]
struct JourneyDto {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    chapters: Vec<ChapterDto>,
}
impl JourneyDto {
    fn to_domain(self) -> Journey {
        Journey {
            level: self.level,
            chapters: self.chapters.into_iter().map(ChapterDto::to_domain).collect(),
        }
    }
}

#[derive(Deserialize)]
struct ChapterDto {
    #[serde(default)]
    chapter: Option<u32>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    topics: Option<Vec<String>>,
    #[serde(default)]
    resources: Option<Vec<String>>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}
impl ChapterDto {
    fn to_domain(self) -> Chapter {
        Chapter {
            number: self.chapter,
            title: self.title,
            description: self.description,
            topics: self.topics.unwrap_or_default(),
            resources: self.resources.unwrap_or_default(),
            script: self.script,
            summary: self.summary,
            completed: self.completed.unwrap_or(false),
        }
    }
}

#[derive(Deserialize)]
struct QuestionDto {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    skill: Option<String>,
}
impl QuestionDto {
    fn to_domain(self) -> QuizQuestion {
        QuizQuestion {
            kind: self.kind,
            question: self.question,
            options: self.options,
            correct_answer: self.correct_answer,
            skill: self.skill,
        }
    }
}

#[derive(Deserialize)]
struct EligibilityDto {
    can_take: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct UsernameCheckDto {
    exists: bool,
}

#[derive(Deserialize)]
struct AvailableSkillsDto {
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Serialize)]
struct ProgressUpdateBody<'a> {
    username: &'a str,
    skill: &'a str,
    chapter_index: usize,
    completed: bool,
}

#[derive(Serialize)]
struct ScoreBody<'a> {
    username: &'a str,
    skill: &'a str,
    score: u32,
}

//=========================================================================================
// `ProgressStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProgressStore for HttpProgressStore {
    async fn get_user_data(&self, username: &str) -> PortResult<UserData> {
        let url = self.endpoint(&["user-data", username])?;
        let record: UserDataRecord = self.get_json(url).await?;
        Ok(record.to_domain())
    }

    async fn update_progress(&self, update: &ProgressUpdate) -> PortResult<()> {
        let url = self.endpoint(&["update-progress"])?;
        let body = ProgressUpdateBody {
            username: &update.username,
            skill: &update.skill,
            chapter_index: update.chapter_index,
            completed: update.completed,
        };
        self.post_json(url, &body).await
    }

    async fn generate_next_chapter(&self, request: &ChapterRequest) -> PortResult<Chapter> {
        let mut url = self.endpoint(&["generate-next-chapter"])?;
        url.query_pairs_mut()
            .append_pair("username", &request.username)
            .append_pair("skill", &request.skill)
            .append_pair("current_chapter", &request.current_chapter.to_string());
        let chapter: ChapterDto = self.get_json(url).await?;
        Ok(chapter.to_domain())
    }

    async fn get_questions(&self, skill: &str) -> PortResult<Vec<QuizQuestion>> {
        let url = self.endpoint(&["questions", skill])?;
        let questions: Vec<QuestionDto> = self.get_json(url).await?;
        Ok(questions.into_iter().map(QuestionDto::to_domain).collect())
    }

    async fn submit_score(&self, submission: &ScoreSubmission) -> PortResult<()> {
        let url = self.endpoint(&["submit-score"])?;
        let body = ScoreBody {
            username: &submission.username,
            skill: &submission.skill,
            score: submission.score,
        };
        self.post_json(url, &body).await
    }

    async fn can_take_quiz(&self, username: &str, skill: &str) -> PortResult<QuizEligibility> {
        let url = self.endpoint(&["can-take-quiz", username, skill])?;
        let dto: EligibilityDto = self.get_json(url).await?;
        Ok(QuizEligibility {
            can_take: dto.can_take,
            message: dto.message,
        })
    }

    async fn available_skills(&self) -> PortResult<Vec<String>> {
        let url = self.endpoint(&["available-skills"])?;
        let dto: AvailableSkillsDto = self.get_json(url).await?;
        Ok(dto.skills)
    }

    async fn check_username(&self, username: &str) -> PortResult<bool> {
        let url = self.endpoint(&["check-username", username])?;
        let dto: UsernameCheckDto = self.get_json(url).await?;
        Ok(dto.exists)
    }
}
