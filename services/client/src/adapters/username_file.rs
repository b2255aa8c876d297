//! services/client/src/adapters/username_file.rs
//!
//! Keeps the chosen username in a single file under the user's config
//! directory (`~/.config/project-learn/username` by default).

use learning_journey_core::ports::{PortError, PortResult, UsernameStore};
use std::fs;
use std::path::{Path, PathBuf};

const USERNAME_FILE: &str = "username";

/// A `UsernameStore` backed by one plain-text file.
#[derive(Clone, Debug)]
pub struct FileUsernameStore {
    path: PathBuf,
}

impl FileUsernameStore {
    /// Stores the username in `dir`; the directory is created on first save.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(USERNAME_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsernameStore for FileUsernameStore {
    fn load(&self) -> PortResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PortError::Unexpected(format!("Failed to read username file at {:?}: {}", self.path, e))
        })?;
        let username = content.trim();
        Ok((!username.is_empty()).then(|| username.to_string()))
    }

    fn save(&self, username: &str) -> PortResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                PortError::Unexpected(format!("Failed to create config directory at {:?}: {}", dir, e))
            })?;
        }
        fs::write(&self.path, username).map_err(|e| {
            PortError::Unexpected(format!("Failed to write username file at {:?}: {}", self.path, e))
        })
    }

    fn clear(&self) -> PortResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.path).map_err(|e| {
            PortError::Unexpected(format!("Failed to remove username file at {:?}: {}", self.path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_and_clear() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileUsernameStore::new(&temp_dir.path().join("nested"));

        assert_eq!(store.load().unwrap(), None);
        store.save("ada").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("ada"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_whitespace_file_reads_as_absent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileUsernameStore::new(temp_dir.path());
        fs::write(store.path(), "  \n").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
