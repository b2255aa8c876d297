//! crates/learning_journey_core/src/quiz.rs
//!
//! Steps through a skill's quiz questions one at a time and tallies the score
//! that seeds the learning journey.

use crate::domain::{QuizQuestion, ScoreSubmission};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("the quiz has no questions")]
    NoQuestions,
    #[error("no option selected for the current question")]
    NoSelection,
    #[error("option {0} does not exist")]
    InvalidOption(usize),
    #[error("the quiz is not finished yet")]
    NotFinished,
}

impl QuizError {
    pub fn user_message(&self) -> String {
        match self {
            QuizError::NoQuestions => "No questions available for this skill.".to_string(),
            QuizError::NoSelection => "Please select an option before proceeding.".to_string(),
            QuizError::InvalidOption(n) => format!("Option {} does not exist.", n + 1),
            QuizError::NotFinished => "Answer every question first.".to_string(),
        }
    }
}

/// What `next` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    /// Moved on to the question at this index.
    Advanced(usize),
    Finished { score: u32, total: usize },
}

#[derive(Debug, Clone)]
pub struct QuizRunner {
    questions: Vec<QuizQuestion>,
    answers: Vec<Option<usize>>,
    current: usize,
    finished: bool,
}

impl QuizRunner {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            questions,
            answers,
            current: 0,
            finished: false,
        })
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The option chosen for the current question, if any.
    pub fn selected(&self) -> Option<usize> {
        self.answers[self.current]
    }

    pub fn select(&mut self, option: usize) -> Result<(), QuizError> {
        if option >= self.current_question().options.len() {
            return Err(QuizError::InvalidOption(option));
        }
        self.answers[self.current] = Some(option);
        Ok(())
    }

    pub fn next(&mut self) -> Result<QuizStep, QuizError> {
        if self.selected().is_none() {
            return Err(QuizError::NoSelection);
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            return Ok(QuizStep::Advanced(self.current));
        }
        self.finished = true;
        Ok(QuizStep::Finished {
            score: self.score(),
            total: self.questions.len(),
        })
    }

    /// Steps back one question. Returns false on the first question.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.finished = false;
        true
    }

    /// Correct answers among the current selections; revised answers count once.
    pub fn score(&self) -> u32 {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| {
                answer
                    .and_then(|i| question.options.get(i))
                    .is_some_and(|chosen| *chosen == question.correct_answer)
            })
            .count() as u32
    }

    pub fn submission(&self, username: &str, skill: &str) -> Result<ScoreSubmission, QuizError> {
        if !self.finished {
            return Err(QuizError::NotFinished);
        }
        Ok(ScoreSubmission {
            username: username.to_string(),
            skill: skill.to_string(),
            score: self.score(),
        })
    }
}
