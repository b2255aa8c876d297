//! crates/learning_journey_core/src/identity.rs
//!
//! Picking a username and remembering it locally. There are no accounts: the
//! backend only tells us whether a name is already in use.

use crate::ports::{PortError, ProgressStore, UsernameStore};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("username is empty")]
    Empty,
    #[error("username '{0}' is already taken")]
    Taken(String),
    #[error(transparent)]
    Store(#[from] PortError),
}

impl IdentityError {
    pub fn user_message(&self) -> String {
        match self {
            IdentityError::Empty => "Please enter a username.".to_string(),
            IdentityError::Taken(_) => "Username already exists. Please choose another.".to_string(),
            IdentityError::Store(e) => format!("Error checking username: {}", e),
        }
    }
}

/// Claims `username` if the backend does not know it yet and stores it locally.
pub async fn register_username(
    store: &dyn ProgressStore,
    local: &dyn UsernameStore,
    username: &str,
) -> Result<String, IdentityError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(IdentityError::Empty);
    }
    if store.check_username(username).await? {
        return Err(IdentityError::Taken(username.to_string()));
    }
    local.save(username)?;
    info!("Registered username '{}'", username);
    Ok(username.to_string())
}

/// The remembered username, ignoring a blank entry.
pub fn current_username(local: &dyn UsernameStore) -> Result<Option<String>, PortError> {
    Ok(local
        .load()?
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeProgressStore, MemoryUsernameStore};

    #[tokio::test]
    async fn test_register_saves_free_username() {
        let store = FakeProgressStore::default();
        let local = MemoryUsernameStore::default();

        let name = register_username(&store, &local, "  ada ").await.unwrap();
        assert_eq!(name, "ada");
        assert_eq!(current_username(&local).unwrap().as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let store = FakeProgressStore::default();
        store.set_taken_usernames(&["Ada"]);
        let local = MemoryUsernameStore::default();

        let err = register_username(&store, &local, "ada").await.unwrap_err();
        assert!(matches!(err, IdentityError::Taken(_)));
        assert_eq!(err.user_message(), "Username already exists. Please choose another.");
        assert!(current_username(&local).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_blank_username() {
        let store = FakeProgressStore::default();
        let local = MemoryUsernameStore::default();
        assert!(matches!(
            register_username(&store, &local, "   ").await,
            Err(IdentityError::Empty)
        ));
    }

    #[test]
    fn test_blank_stored_username_counts_as_absent() {
        let local = MemoryUsernameStore::with_username("  ");
        assert!(current_username(&local).unwrap().is_none());
    }
}
