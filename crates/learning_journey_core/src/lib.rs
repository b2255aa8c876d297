pub mod dashboard;
pub mod domain;
pub mod identity;
pub mod journey;
pub mod ports;
pub mod quiz;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dashboard::{Dashboard, SkillSummary};
pub use domain::{
    Chapter, ChapterRequest, Journey, ProgressUpdate, QuizEligibility, QuizQuestion,
    ScoreSubmission, SkillRecord, UserData,
};
pub use identity::{current_username, register_username, IdentityError};
pub use journey::{JourneyController, JourneyError, JourneyPhase};
pub use ports::{PortError, PortResult, ProgressStore, UsernameStore};
pub use quiz::{QuizError, QuizRunner, QuizStep};
