//! Shared world state for story review BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use storydesk::story::{
    adapters::{
        logging::TracingNotifier,
        memory::{InMemoryStoryRepository, InMemoryUserDirectory},
    },
    domain::{Actor, Role, Story, StoryId, UserId},
    ports::UserProfile,
    services::{StoryWorkflowError, StoryWorkflowService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestStoryService = StoryWorkflowService<
    InMemoryStoryRepository,
    InMemoryUserDirectory,
    TracingNotifier,
    DefaultClock,
>;

/// Scenario world for story review behaviour tests.
pub struct StoryWorld {
    pub service: TestStoryService,
    pub directory: Arc<InMemoryUserDirectory>,
    pub actors: HashMap<String, Actor>,
    pub story_id: Option<StoryId>,
    pub last_result: Option<Result<Story, StoryWorkflowError>>,
}

impl StoryWorld {
    /// Creates a world with an empty desk.
    #[must_use]
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let service = StoryWorkflowService::new(
            Arc::new(InMemoryStoryRepository::new()),
            Arc::clone(&directory),
            Arc::new(TracingNotifier::new()),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            directory,
            actors: HashMap::new(),
            story_id: None,
            last_result: None,
        }
    }

    /// Registers a named user with `role`.
    pub fn enrol(&mut self, name: &str, role: Role) -> Result<(), eyre::Report> {
        let actor = Actor::new(UserId::new(), role);
        self.directory
            .insert(UserProfile::new(actor.id(), name, role))?;
        self.actors.insert(name.to_owned(), actor);
        Ok(())
    }

    /// Returns the actor registered as `name`.
    pub fn actor(&self, name: &str) -> Result<Actor, eyre::Report> {
        self.actors
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no user named {name} in scenario world"))
    }

    /// Returns the story the scenario is about.
    pub fn story_id(&self) -> Result<StoryId, eyre::Report> {
        self.story_id
            .ok_or_else(|| eyre::eyre!("no story submitted in scenario world"))
    }
}

impl Default for StoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> StoryWorld {
    StoryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
