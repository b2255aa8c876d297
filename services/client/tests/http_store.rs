//! Exercises `HttpProgressStore` against an in-process backend.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use client_lib::adapters::HttpProgressStore;
use learning_journey_core::domain::{ChapterRequest, ProgressUpdate, ScoreSubmission};
use learning_journey_core::ports::{PortError, ProgressStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Backend {
    posts: Arc<Mutex<Vec<(String, Value)>>>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn user_data(Path(username): Path<String>) -> impl IntoResponse {
    if username != "ada lovelace" {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "User not found"}))).into_response();
    }
    Json(json!({
        "skills": [{
            "skill": "Python",
            "score": 15,
            "progress": 20.0,
            "last_attempt_date": "2025-03-01",
            "learning_journey": {
                "level": "Intermediate",
                "chapters": [
                    {"chapter": 1, "title": "Intro", "script": "s1", "completed": true},
                    {"chapter": 2, "title": "Loops", "script": null, "topics": null}
                ]
            }
        }]
    }))
    .into_response()
}

async fn update_progress(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    backend.posts.lock().unwrap().push(("update-progress".to_string(), body));
    Json(json!({"message": "Progress updated"}))
}

async fn submit_score(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    backend.posts.lock().unwrap().push(("submit-score".to_string(), body));
    Json(json!({"message": "Score submitted"}))
}

async fn generate_next_chapter(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    backend.queries.lock().unwrap().push(params.clone());
    if params.get("skill").map(String::as_str) == Some("Broken") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Generation failed"})),
        )
            .into_response();
    }
    Json(json!({
        "chapter": 3,
        "title": "Functions",
        "description": "Defining functions",
        "topics": ["def", "return"],
        "resources": ["https://docs.python.org"],
        "script": "Functions group code.",
        "summary": "You can define functions.",
        "completed": false
    }))
    .into_response()
}

async fn questions(Path(skill): Path<String>) -> Json<Value> {
    Json(json!([{
        "type": "mcq",
        "question": format!("What is {}?", skill),
        "options": ["A language", "A snake"],
        "correct_answer": "A language",
        "skill": skill
    }]))
}

async fn check_username(Path(username): Path<String>) -> Json<Value> {
    Json(json!({"exists": username == "taken"}))
}

async fn can_take_quiz(Path((username, _skill)): Path<(String, String)>) -> Json<Value> {
    if username == "veteran" {
        Json(json!({"can_take": false, "message": "You have already taken this quiz."}))
    } else {
        Json(json!({"can_take": true}))
    }
}

async fn available_skills() -> Json<Value> {
    Json(json!({"skills": ["Python", "SQL"]}))
}

async fn spawn_backend() -> (HttpProgressStore, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/user-data/{username}", get(user_data))
        .route("/update-progress", post(update_progress))
        .route("/submit-score", post(submit_score))
        .route("/generate-next-chapter", get(generate_next_chapter))
        .route("/questions/{skill}", get(questions))
        .route("/check-username/{username}", get(check_username))
        .route("/can-take-quiz/{username}/{skill}", get(can_take_quiz))
        .route("/available-skills", get(available_skills))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = HttpProgressStore::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    (store, backend)
}

#[tokio::test]
async fn test_get_user_data_decodes_journeys() {
    let (store, _) = spawn_backend().await;

    let data = store.get_user_data("ada lovelace").await.unwrap();
    let python = data.find_skill("python").unwrap();
    assert_eq!(python.score, 15);
    let journey = python.learning_journey.as_ref().unwrap();
    assert_eq!(journey.chapters.len(), 2);
    assert!(journey.chapters[0].completed);
    assert!(!journey.chapters[1].has_script());
    assert!(journey.chapters[1].topics.is_empty());
}

#[tokio::test]
async fn test_unknown_user_maps_to_not_found() {
    let (store, _) = spawn_backend().await;

    match store.get_user_data("nobody").await {
        Err(PortError::NotFound(detail)) => assert_eq!(detail, "User not found"),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_update_progress_posts_json_body() {
    let (store, backend) = spawn_backend().await;

    store
        .update_progress(&ProgressUpdate {
            username: "ada".to_string(),
            skill: "Python".to_string(),
            chapter_index: 4,
            completed: true,
        })
        .await
        .unwrap();

    let posts = backend.posts.lock().unwrap().clone();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "update-progress");
    assert_eq!(
        posts[0].1,
        json!({"username": "ada", "skill": "Python", "chapter_index": 4, "completed": true})
    );
}

#[tokio::test]
async fn test_generate_next_chapter_sends_query_params() {
    let (store, backend) = spawn_backend().await;

    let chapter = store
        .generate_next_chapter(&ChapterRequest {
            username: "ada lovelace".to_string(),
            skill: "C++".to_string(),
            current_chapter: 1,
        })
        .await
        .unwrap();

    assert_eq!(chapter.number, Some(3));
    assert_eq!(chapter.title.as_deref(), Some("Functions"));
    assert_eq!(chapter.resources, vec!["https://docs.python.org".to_string()]);
    assert!(chapter.has_script());

    let queries = backend.queries.lock().unwrap().clone();
    assert_eq!(queries[0]["username"], "ada lovelace");
    assert_eq!(queries[0]["skill"], "C++");
    assert_eq!(queries[0]["current_chapter"], "1");
}

#[tokio::test]
async fn test_server_error_maps_to_unexpected_with_detail() {
    let (store, _) = spawn_backend().await;

    let err = store
        .generate_next_chapter(&ChapterRequest {
            username: "ada".to_string(),
            skill: "Broken".to_string(),
            current_chapter: 0,
        })
        .await
        .unwrap_err();
    match err {
        PortError::Unexpected(message) => assert!(message.contains("Generation failed")),
        other => panic!("expected Unexpected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_quiz_endpoints() {
    let (store, backend) = spawn_backend().await;

    let questions = store.get_questions("Python").await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].kind.as_deref(), Some("mcq"));
    assert_eq!(questions[0].correct_answer, "A language");

    let eligibility = store.can_take_quiz("veteran", "Python").await.unwrap();
    assert!(!eligibility.can_take);
    assert_eq!(eligibility.message.as_deref(), Some("You have already taken this quiz."));
    assert!(store.can_take_quiz("ada", "Python").await.unwrap().can_take);

    store
        .submit_score(&ScoreSubmission {
            username: "ada".to_string(),
            skill: "Python".to_string(),
            score: 17,
        })
        .await
        .unwrap();
    let posts = backend.posts.lock().unwrap().clone();
    assert_eq!(posts[0].1, json!({"username": "ada", "skill": "Python", "score": 17}));
}

#[tokio::test]
async fn test_username_and_skill_listing() {
    let (store, _) = spawn_backend().await;

    assert!(store.check_username("taken").await.unwrap());
    assert!(!store.check_username("free").await.unwrap());
    assert_eq!(
        store.available_skills().await.unwrap(),
        vec!["Python".to_string(), "SQL".to_string()]
    );
}
