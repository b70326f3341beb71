//! Shared test helpers for in-memory story workflow integration tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use storydesk::story::{
    adapters::memory::{InMemoryStoryRepository, InMemoryUserDirectory, RecordingNotifier},
    domain::{Actor, PersistedStoryData, Story, StoryId, StoryStatus, UserId},
    ports::UserProfile,
    services::StoryWorkflowService,
};

/// Workflow service wired to in-memory adapters.
pub type TestService = StoryWorkflowService<
    InMemoryStoryRepository,
    InMemoryUserDirectory,
    RecordingNotifier,
    DefaultClock,
>;

/// Service plus handles on its adapters.
pub struct Newsdesk {
    pub service: TestService,
    pub directory: Arc<InMemoryUserDirectory>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Newsdesk {
    /// Registers `actor` under `name` in the user directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory rejects the profile.
    pub fn enrol(&self, actor: &Actor, name: &str) -> eyre::Result<()> {
        self.directory
            .insert(UserProfile::new(actor.id(), name, actor.role()))?;
        Ok(())
    }
}

/// Provides a fresh desk for each test.
#[fixture]
pub fn newsdesk() -> Newsdesk {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let service = StoryWorkflowService::new(
        Arc::new(InMemoryStoryRepository::new()),
        Arc::clone(&directory),
        Arc::clone(&notifier),
        Arc::new(DefaultClock),
    );
    Newsdesk {
        service,
        directory,
        notifier,
    }
}

/// Provides a fresh repository for each test.
#[fixture]
pub fn repo() -> InMemoryStoryRepository {
    InMemoryStoryRepository::new()
}

/// Builds a persisted story with a creation time `age_minutes` in the past.
#[must_use]
pub fn persisted_story(
    title: &str,
    status: StoryStatus,
    author: UserId,
    reviewer: Option<UserId>,
    age_minutes: i64,
) -> Story {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    Story::from_persisted(PersistedStoryData {
        id: StoryId::new(),
        title: title.to_owned(),
        content: "Copy filed from the council chamber.".to_owned(),
        status,
        author_id: author,
        reviewer_id: reviewer,
        feedback: None,
        created_at,
        updated_at: created_at,
        deleted_at: None,
        revision: 0,
    })
}
