//! services/client/src/terminal/mod.rs
//!
//! The terminal front end: line-based views driven by a `Console`.

pub mod command;
pub mod console;
pub mod dashboard_view;
pub mod journey_view;
pub mod quiz_view;

pub use console::{stdin_console, Console};
pub use dashboard_view::{show_available_skills, show_dashboard};
pub use journey_view::run_journey_view;
pub use quiz_view::{run_quiz, QuizOutcome};
