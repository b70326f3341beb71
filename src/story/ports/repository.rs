//! Repository port for story persistence, conditional updates and stats.

use crate::story::domain::{StatsScope, Story, StoryGuard, StoryId, StoryQuery, StoryStats};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for story repository operations.
pub type StoryRepositoryResult<T> = Result<T, StoryRepositoryError>;

/// Story persistence contract.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Stores a new story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryRepositoryError::DuplicateStory`] when the story ID
    /// already exists.
    async fn store(&self, story: &Story) -> StoryRepositoryResult<()>;

    /// Finds a story by identifier, including soft-deleted stories.
    ///
    /// Returns `None` when the story does not exist.
    async fn find_by_id(&self, id: StoryId) -> StoryRepositoryResult<Option<Story>>;

    /// Returns stories matching `query`, oldest first.
    async fn list(&self, query: &StoryQuery) -> StoryRepositoryResult<Vec<Story>>;

    /// Replaces the stored story only if it still matches `expected`.
    ///
    /// The check and the write happen atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoryRepositoryError::NotFound`] when the story does not
    /// exist and [`StoryRepositoryError::Conflict`] when the stored story no
    /// longer matches `expected`.
    async fn compare_and_swap(
        &self,
        expected: StoryGuard,
        story: &Story,
    ) -> StoryRepositoryResult<()>;

    /// Permanently removes a soft-deleted story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryRepositoryError::NotFound`] when the story does not
    /// exist and [`StoryRepositoryError::Conflict`] when it is not
    /// soft-deleted.
    async fn purge(&self, id: StoryId) -> StoryRepositoryResult<()>;

    /// Computes stats for `scope` in a single pass over live stories.
    async fn stats(&self, scope: StatsScope) -> StoryRepositoryResult<StoryStats>;
}

/// Errors returned by story repository implementations.
#[derive(Debug, Clone, Error)]
pub enum StoryRepositoryError {
    /// A story with the same identifier already exists.
    #[error("duplicate story identifier: {0}")]
    DuplicateStory(StoryId),

    /// The story was not found.
    #[error("story not found: {0}")]
    NotFound(StoryId),

    /// The stored story changed since it was loaded.
    #[error("story {0} was modified concurrently")]
    Conflict(StoryId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
