//! Identity provider port used for reviewer checks and display names.

use crate::story::domain::{Role, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory lookups.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// User data exposed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Stable user identifier.
    pub id: UserId,
    /// Name shown in author and reviewer columns.
    pub display_name: String,
    /// Role held by the user.
    pub role: Role,
}

impl UserProfile {
    /// Creates a user profile.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role,
        }
    }
}

/// Read-only user lookup contract.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user is unknown.
    async fn find_user(&self, id: UserId) -> UserDirectoryResult<Option<UserProfile>>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// Identity provider failure.
    #[error("user directory error: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a lookup error.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
