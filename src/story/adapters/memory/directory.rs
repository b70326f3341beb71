//! In-memory user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::story::{
    domain::UserId,
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult, UserProfile},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user profile.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the internal lock is poisoned.
    pub fn insert(&self, profile: UserProfile) -> UserDirectoryResult<()> {
        let mut users = self.users.write().map_err(|err| {
            UserDirectoryError::lookup(std::io::Error::other(err.to_string()))
        })?;
        users.insert(profile.id, profile);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> UserDirectoryResult<Option<UserProfile>> {
        let users = self.users.read().map_err(|err| {
            UserDirectoryError::lookup(std::io::Error::other(err.to_string()))
        })?;
        Ok(users.get(&id).cloned())
    }
}
