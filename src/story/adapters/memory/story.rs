//! In-memory repository for story workflow tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::story::{
    domain::{StatsScope, Story, StoryGuard, StoryId, StoryQuery, StoryStats},
    ports::{StoryRepository, StoryRepositoryError, StoryRepositoryResult},
};

/// Thread-safe in-memory story repository.
///
/// Conditional writes hold the write lock across the guard check and the
/// replacement, which makes them atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoryRepository {
    stories: Arc<RwLock<HashMap<StoryId, Story>>>,
}

impl InMemoryStoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoryRepositoryResult<RwLockReadGuard<'_, HashMap<StoryId, Story>>> {
        self.stories.read().map_err(|err| {
            StoryRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> StoryRepositoryResult<RwLockWriteGuard<'_, HashMap<StoryId, Story>>> {
        self.stories.write().map_err(|err| {
            StoryRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl StoryRepository for InMemoryStoryRepository {
    async fn store(&self, story: &Story) -> StoryRepositoryResult<()> {
        let mut stories = self.write()?;
        if stories.contains_key(&story.id()) {
            return Err(StoryRepositoryError::DuplicateStory(story.id()));
        }
        stories.insert(story.id(), story.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: StoryId) -> StoryRepositoryResult<Option<Story>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list(&self, query: &StoryQuery) -> StoryRepositoryResult<Vec<Story>> {
        let stories = self.read()?;
        let mut matching: Vec<Story> = stories
            .values()
            .filter(|story| query.matches(story))
            .cloned()
            .collect();
        matching.sort_by_key(|story| (story.created_at(), story.id()));
        Ok(matching)
    }

    async fn compare_and_swap(
        &self,
        expected: StoryGuard,
        story: &Story,
    ) -> StoryRepositoryResult<()> {
        let mut stories = self.write()?;
        let current = stories
            .get_mut(&story.id())
            .ok_or(StoryRepositoryError::NotFound(story.id()))?;
        if current.guard() != expected {
            return Err(StoryRepositoryError::Conflict(story.id()));
        }
        *current = story.clone();
        Ok(())
    }

    async fn purge(&self, id: StoryId) -> StoryRepositoryResult<()> {
        let mut stories = self.write()?;
        let current = stories.get(&id).ok_or(StoryRepositoryError::NotFound(id))?;
        if !current.is_deleted() {
            return Err(StoryRepositoryError::Conflict(id));
        }
        stories.remove(&id);
        Ok(())
    }

    async fn stats(&self, scope: StatsScope) -> StoryRepositoryResult<StoryStats> {
        let stories = self.read()?;
        Ok(StoryStats::tally(scope, stories.values()))
    }
}
