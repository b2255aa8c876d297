//! services/client/src/terminal/dashboard_view.rs

use crate::error::ClientError;
use crate::terminal::console::Console;
use futures::Stream;
use learning_journey_core::dashboard::{Dashboard, EMPTY_DASHBOARD_MESSAGE};
use learning_journey_core::ports::{PortError, ProgressStore};
use std::io::Write;
use tokio_util::codec::LinesCodecError;

/// Prints per-skill progress for `username`.
pub async fn show_dashboard<I, W>(
    store: &dyn ProgressStore,
    username: &str,
    console: &mut Console<I, W>,
) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    let data = match store.get_user_data(username).await {
        Ok(data) => data,
        // A user who never took a quiz has no record yet.
        Err(PortError::NotFound(_)) => Default::default(),
        Err(e) => return Err(e.into()),
    };
    let dashboard = Dashboard::from_user_data(username, &data);

    console.say(format!("Dashboard for {}", dashboard.username))?;
    if dashboard.is_empty() {
        console.say(EMPTY_DASHBOARD_MESSAGE)?;
        return Ok(());
    }

    for summary in &dashboard.skills {
        let last = summary
            .last_attempt_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());
        console.say(format!(
            "{:<20} score {:>5}  progress {:>6}  chapters {}/{}  last attempt {}",
            summary.skill,
            summary.score_label(),
            summary.progress_label(),
            summary.chapters_completed,
            summary.chapters_total,
            last
        ))?;
    }
    if let Some(average) = dashboard.average_progress() {
        console.say(format!("Overall progress: {:.1}%", average))?;
    }
    Ok(())
}

/// Prints the skills a quiz can be taken for.
pub async fn show_available_skills<I, W>(
    store: &dyn ProgressStore,
    console: &mut Console<I, W>,
) -> Result<(), ClientError>
where
    I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
    W: Write,
{
    let skills = store.available_skills().await?;
    if skills.is_empty() {
        console.say("No skills available right now.")?;
        return Ok(());
    }
    console.say("Available skills:")?;
    for skill in skills {
        console.say(format!("  - {}", skill))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::console::scripted::{console, output};
    use chrono::NaiveDate;
    use learning_journey_core::domain::UserData;
    use learning_journey_core::testing::{journey, skill_record, FakeProgressStore};

    #[tokio::test]
    async fn test_dashboard_lists_each_skill() {
        let mut python = skill_record("Python", Some(journey(&[true, false])));
        python.progress = 50.0;
        python.last_attempt_date = NaiveDate::from_ymd_opt(2025, 3, 1);
        let sql = skill_record("SQL", None);
        let store = FakeProgressStore::with_user_data(UserData {
            skills: vec![python, sql],
        });
        let mut console = console(&[]);

        show_dashboard(&store, "ada", &mut console).await.unwrap();

        let text = output(console);
        assert!(text.contains("Dashboard for ada"));
        assert!(text.contains("12/20"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("chapters 1/2"));
        assert!(text.contains("last attempt 2025-03-01"));
        assert!(text.contains("last attempt never"));
        assert!(text.contains("Overall progress: 25.0%"));
    }

    #[tokio::test]
    async fn test_empty_dashboard_message() {
        let store = FakeProgressStore::default();
        let mut console = console(&[]);

        show_dashboard(&store, "ada", &mut console).await.unwrap();

        assert!(output(console).contains(EMPTY_DASHBOARD_MESSAGE));
    }

    #[tokio::test]
    async fn test_available_skills_are_listed() {
        let store = FakeProgressStore::default();
        store.set_available_skills(&["Python", "SQL"]);
        let mut console = console(&[]);

        show_available_skills(&store, &mut console).await.unwrap();

        let text = output(console);
        assert!(text.contains("  - Python"));
        assert!(text.contains("  - SQL"));
    }
}
