//! Service layer for the story review workflow.
//!
//! Each mutating operation loads the story, applies the visibility policy,
//! lets the aggregate validate and apply the change and then persists it
//! through a compare-and-set keyed on the guard captured at load time.
//! Committed events are handed to the notifier afterwards.

use crate::story::{
    domain::{
        Actor, BadgeColor, Capability, DeletionConfirmation, ParseStoryStatusError, Resolution,
        ReviewOutcome, Role, StatsScope, Story, StoryDomainError, StoryDraft, StoryEvent,
        StoryEventKind, StoryFilter, StoryGuard, StoryId, StoryQuery, StoryStats, StoryStatus,
        StoryValidationError, UserId, WorkflowRules,
    },
    ports::{
        StoryNotifier, StoryRepository, StoryRepositoryError, UserDirectory, UserDirectoryError,
        UserProfile,
    },
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for moving a story to a status submitted as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionStoryRequest {
    story_id: StoryId,
    target: String,
    feedback: Option<String>,
}

impl TransitionStoryRequest {
    /// Creates a request targeting `target`, e.g. `"in_review"` or
    /// `"rework"`.
    #[must_use]
    pub fn new(story_id: StoryId, target: impl Into<String>) -> Self {
        Self {
            story_id,
            target: target.into(),
            feedback: None,
        }
    }

    /// Attaches reviewer feedback.
    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    /// Returns the story the request targets.
    #[must_use]
    pub const fn story_id(&self) -> StoryId {
        self.story_id
    }
}

/// Listing row decorated for the story table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryTableRow {
    /// The listed story.
    pub story: Story,
    /// Author display name, when the directory knows the author.
    pub author_name: Option<String>,
    /// Reviewer display name, when a known reviewer is assigned.
    pub reviewer_name: Option<String>,
    /// Human status label.
    pub status_label: &'static str,
    /// Status badge colour.
    pub badge: BadgeColor,
}

/// Coarse classification of workflow failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A payload field is missing or malformed.
    Validation,
    /// The actor's role lacks the capability.
    Unauthorized,
    /// A reviewer acted on another reviewer's story.
    OwnershipViolation,
    /// The move is not part of the workflow, or lost a race.
    InvalidTransition,
    /// The story does not exist or is invisible to the actor.
    NotFound,
    /// Storage or identity provider failure.
    Infrastructure,
}

/// Service-level errors for story workflow operations.
#[derive(Debug, Error)]
pub enum StoryWorkflowError {
    /// The domain rejected the operation.
    #[error(transparent)]
    Domain(#[from] StoryDomainError),
    /// The story does not exist or is not visible to the actor.
    #[error("story not found: {0}")]
    NotFound(StoryId),
    /// The submitted target status is unknown.
    #[error(transparent)]
    InvalidStatus(#[from] ParseStoryStatusError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] StoryRepositoryError),
    /// User directory lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
}

impl From<StoryValidationError> for StoryWorkflowError {
    fn from(err: StoryValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl StoryWorkflowError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(StoryDomainError::Validation(_)) | Self::InvalidStatus(_) => {
                ErrorKind::Validation
            }
            Self::Domain(StoryDomainError::Unauthorized { .. }) => ErrorKind::Unauthorized,
            Self::Domain(StoryDomainError::OwnershipViolation { .. }) => {
                ErrorKind::OwnershipViolation
            }
            Self::Domain(StoryDomainError::InvalidTransition { .. })
            | Self::Repository(StoryRepositoryError::Conflict(_)) => ErrorKind::InvalidTransition,
            Self::NotFound(_) | Self::Repository(StoryRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Repository(
                StoryRepositoryError::DuplicateStory(_) | StoryRepositoryError::Persistence(_),
            )
            | Self::Directory(_) => ErrorKind::Infrastructure,
        }
    }
}

/// Result type for story workflow service operations.
pub type StoryWorkflowResult<T> = Result<T, StoryWorkflowError>;

/// Story workflow orchestration service.
#[derive(Clone)]
pub struct StoryWorkflowService<R, D, N, C>
where
    R: StoryRepository,
    D: UserDirectory,
    N: StoryNotifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    notifier: Arc<N>,
    clock: Arc<C>,
    rules: WorkflowRules,
}

impl<R, D, N, C> StoryWorkflowService<R, D, N, C>
where
    R: StoryRepository,
    D: UserDirectory,
    N: StoryNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a new story workflow service with default rules.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            notifier,
            clock,
            rules: WorkflowRules::default(),
        }
    }

    /// Replaces the workflow rules.
    #[must_use]
    pub const fn with_rules(mut self, rules: WorkflowRules) -> Self {
        self.rules = rules;
        self
    }

    /// Returns the active workflow rules.
    #[must_use]
    pub const fn rules(&self) -> &WorkflowRules {
        &self.rules
    }

    /// Creates a story authored by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the actor may not create
    /// stories or the title or content is invalid, and
    /// [`StoryWorkflowError::Repository`] when persistence fails.
    pub async fn create_story(
        &self,
        actor: &Actor,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> StoryWorkflowResult<Story> {
        actor
            .authorize(Capability::CreateStory)
            .map_err(|err| denied(actor, None, err))?;
        let draft = StoryDraft::new(title, content, &self.rules)
            .map_err(|err| denied(actor, None, err.into()))?;
        let story = Story::submit(actor, draft, &*self.clock)?;
        self.repository.store(&story).await?;

        tracing::info!(
            story_id = %story.id(),
            actor_id = %actor.id(),
            "story submitted for review"
        );
        self.publish(&StoryEvent::new(
            story.id(),
            actor.id(),
            StoryEventKind::Created,
            story.created_at(),
        ))
        .await;
        Ok(story)
    }

    /// Lists the stories `actor` may see that match `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Repository`] when the lookup fails.
    pub async fn list_visible_stories(
        &self,
        actor: &Actor,
        filter: &StoryFilter,
    ) -> StoryWorkflowResult<Vec<Story>> {
        let query = StoryQuery::for_actor(actor, filter);
        Ok(self.repository.list(&query).await?)
    }

    /// Lists visible stories decorated with display names and status
    /// badges.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Repository`] or
    /// [`StoryWorkflowError::Directory`] when a lookup fails.
    pub async fn list_table_rows(
        &self,
        actor: &Actor,
        filter: &StoryFilter,
    ) -> StoryWorkflowResult<Vec<StoryTableRow>> {
        let stories = self.list_visible_stories(actor, filter).await?;
        let mut names: HashMap<UserId, Option<String>> = HashMap::new();
        let mut rows = Vec::with_capacity(stories.len());
        for story in stories {
            let author_name = self.display_name(&mut names, story.author_id()).await?;
            let reviewer_name = match story.reviewer_id() {
                Some(reviewer) => self.display_name(&mut names, reviewer).await?,
                None => None,
            };
            rows.push(StoryTableRow {
                status_label: story.status().label(),
                badge: story.status().badge_color(),
                author_name,
                reviewer_name,
                story,
            });
        }
        Ok(rows)
    }

    /// Returns a single story visible to `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::NotFound`] when the story does not
    /// exist or is not visible to the actor.
    pub async fn get_story(&self, actor: &Actor, story_id: StoryId) -> StoryWorkflowResult<Story> {
        self.load_visible(actor, story_id).await
    }

    /// Starts a review of a waiting story.
    ///
    /// Claiming a story the reviewer already holds succeeds without
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the workflow, role or
    /// ownership rules reject the claim or another reviewer won a race for
    /// it.
    pub async fn claim_for_review(
        &self,
        actor: &Actor,
        story_id: StoryId,
    ) -> StoryWorkflowResult<Story> {
        let mut story = self.load_visible(actor, story_id).await?;
        let expected = story.guard();
        match story.claim(actor, &*self.clock) {
            Ok(Some(event)) => {
                self.commit(expected, &story, event, StoryStatus::InReview.as_str())
                    .await?;
                Ok(story)
            }
            Ok(None) => Ok(story),
            Err(err) => Err(denied(actor, Some(story_id), err)),
        }
    }

    /// Closes the review held by `actor` with `outcome`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the story is not in
    /// review, the actor does not hold it or required feedback is missing.
    pub async fn resolve_review(
        &self,
        actor: &Actor,
        story_id: StoryId,
        outcome: ReviewOutcome,
        feedback: Option<String>,
    ) -> StoryWorkflowResult<Story> {
        let mut story = self.load_visible(actor, story_id).await?;
        let expected = story.guard();
        let event = story
            .resolve(
                actor,
                Resolution::new(outcome, feedback),
                &self.rules,
                &*self.clock,
            )
            .map_err(|err| denied(actor, Some(story_id), err))?;
        self.commit(expected, &story, event, outcome.as_str())
            .await?;
        Ok(story)
    }

    /// Moves a story to the status named in `request`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::InvalidStatus`] for unknown status
    /// labels and otherwise the errors of [`Self::claim_for_review`] and
    /// [`Self::resolve_review`].
    pub async fn transition_story(
        &self,
        actor: &Actor,
        request: TransitionStoryRequest,
    ) -> StoryWorkflowResult<Story> {
        let target = StoryStatus::try_from(request.target.as_str())?;
        let mut story = self.load_visible(actor, request.story_id).await?;
        let expected = story.guard();
        let event = story
            .transition_to(actor, target, request.feedback, &self.rules, &*self.clock)
            .map_err(|err| denied(actor, Some(request.story_id), err))?;
        if let Some(committed) = event {
            self.commit(expected, &story, committed, target.as_str())
                .await?;
        }
        Ok(story)
    }

    /// Replaces the title and content of a story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the actor may not edit
    /// the story or the new title or content is invalid.
    pub async fn revise_story(
        &self,
        actor: &Actor,
        story_id: StoryId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> StoryWorkflowResult<Story> {
        let mut story = self.load_visible(actor, story_id).await?;
        story
            .ensure_editable(actor)
            .map_err(|err| denied(actor, Some(story_id), err))?;
        let draft = StoryDraft::new(title, content, &self.rules)
            .map_err(|err| denied(actor, Some(story_id), err.into()))?;
        let expected = story.guard();
        let event = story
            .revise(actor, draft, &*self.clock)
            .map_err(|err| denied(actor, Some(story_id), err))?;
        self.commit(expected, &story, event, "revised").await?;
        Ok(story)
    }

    /// Places a waiting story in `reviewer_id`'s queue.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the story is not waiting,
    /// the actor is not an admin or the assignee is not a known reviewer.
    pub async fn assign_reviewer(
        &self,
        actor: &Actor,
        story_id: StoryId,
        reviewer_id: UserId,
    ) -> StoryWorkflowResult<Story> {
        let mut story = self.load_visible(actor, story_id).await?;
        let expected = story.guard();
        let event = story
            .assign_reviewer(actor, reviewer_id, &*self.clock)
            .map_err(|err| denied(actor, Some(story_id), err))?;
        self.ensure_reviewer(reviewer_id)
            .await
            .map_err(|err| match err {
                StoryWorkflowError::Domain(domain) => denied(actor, Some(story_id), domain),
                other => other,
            })?;
        self.commit(expected, &story, event, "assigned").await?;
        Ok(story)
    }

    /// Soft-deletes a story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the story is already
    /// deleted, the actor is not an admin or the deletion is unconfirmed.
    pub async fn soft_delete(
        &self,
        actor: &Actor,
        story_id: StoryId,
        confirmation: DeletionConfirmation,
    ) -> StoryWorkflowResult<Story> {
        let mut story = self.load_visible(actor, story_id).await?;
        let expected = story.guard();
        let event = story
            .soft_delete(actor, confirmation, &*self.clock)
            .map_err(|err| denied(actor, Some(story_id), err))?;
        self.commit(expected, &story, event, "deleted").await?;
        Ok(story)
    }

    /// Restores a soft-deleted story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the story is not deleted
    /// or the actor is not an admin.
    pub async fn restore(&self, actor: &Actor, story_id: StoryId) -> StoryWorkflowResult<Story> {
        let mut story = self.load_visible(actor, story_id).await?;
        let expected = story.guard();
        let event = story
            .restore(actor, &*self.clock)
            .map_err(|err| denied(actor, Some(story_id), err))?;
        self.commit(expected, &story, event, "active").await?;
        Ok(story)
    }

    /// Permanently removes a soft-deleted story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Domain`] when the story is not deleted
    /// or the actor is not an admin.
    pub async fn purge(&self, actor: &Actor, story_id: StoryId) -> StoryWorkflowResult<()> {
        let story = self.load_visible(actor, story_id).await?;
        let event = story
            .ensure_purgeable(actor, &*self.clock)
            .map_err(|err| denied(actor, Some(story_id), err))?;
        self.repository
            .purge(story_id)
            .await
            .map_err(|err| translate_write_error(err, story.guard(), "purged"))?;

        tracing::info!(story_id = %story_id, actor_id = %actor.id(), "story purged");
        self.publish(&event).await;
        Ok(())
    }

    /// Returns the dashboard stats scoped to `actor`'s role.
    ///
    /// # Errors
    ///
    /// Returns [`StoryWorkflowError::Repository`] when the aggregation
    /// fails.
    pub async fn get_status_counts(&self, actor: &Actor) -> StoryWorkflowResult<StoryStats> {
        Ok(self.repository.stats(StatsScope::for_actor(actor)).await?)
    }

    async fn load_visible(&self, actor: &Actor, story_id: StoryId) -> StoryWorkflowResult<Story> {
        match self.repository.find_by_id(story_id).await? {
            Some(story) if actor.can_view(&story) => Ok(story),
            _ => Err(StoryWorkflowError::NotFound(story_id)),
        }
    }

    async fn ensure_reviewer(&self, user_id: UserId) -> StoryWorkflowResult<()> {
        match self.directory.find_user(user_id).await? {
            Some(UserProfile {
                role: Role::Reviewer,
                ..
            }) => Ok(()),
            Some(_) => Err(StoryValidationError::NotAReviewer(user_id).into()),
            None => Err(StoryValidationError::UnknownUser(user_id).into()),
        }
    }

    async fn display_name(
        &self,
        cache: &mut HashMap<UserId, Option<String>>,
        user_id: UserId,
    ) -> StoryWorkflowResult<Option<String>> {
        if let Some(name) = cache.get(&user_id) {
            return Ok(name.clone());
        }
        let name = self
            .directory
            .find_user(user_id)
            .await?
            .map(|profile| profile.display_name);
        cache.insert(user_id, name.clone());
        Ok(name)
    }

    async fn commit(
        &self,
        expected: StoryGuard,
        story: &Story,
        event: StoryEvent,
        target: &str,
    ) -> StoryWorkflowResult<()> {
        self.repository
            .compare_and_swap(expected, story)
            .await
            .map_err(|err| translate_write_error(err, expected, target))?;

        tracing::info!(
            story_id = %story.id(),
            actor_id = %event.actor_id,
            event = event.name(),
            status = story.status().as_str(),
            "story transition applied"
        );
        self.publish(&event).await;
        Ok(())
    }

    async fn publish(&self, event: &StoryEvent) {
        if let Err(err) = self.notifier.notify(event).await {
            tracing::warn!(
                story_id = %event.story_id,
                event = event.name(),
                error = %err,
                "story event delivery failed"
            );
        }
    }
}

fn denied(actor: &Actor, story_id: Option<StoryId>, err: StoryDomainError) -> StoryWorkflowError {
    tracing::debug!(
        story_id = story_id.map(tracing::field::display),
        actor_id = %actor.id(),
        role = actor.role().as_str(),
        error = %err,
        "story operation denied"
    );
    err.into()
}

/// Maps a failed conditional write; a lost race reads as an invalid
/// transition from the position the story was loaded in.
fn translate_write_error(
    err: StoryRepositoryError,
    expected: StoryGuard,
    target: &str,
) -> StoryWorkflowError {
    match err {
        StoryRepositoryError::Conflict(story_id) => {
            tracing::debug!(story_id = %story_id, to = target, "conditional story write lost");
            let from = if expected.deleted {
                "deleted"
            } else {
                expected.status.as_str()
            };
            StoryDomainError::InvalidTransition {
                story_id,
                from: from.to_owned(),
                to: target.to_owned(),
            }
            .into()
        }
        StoryRepositoryError::NotFound(story_id) => StoryWorkflowError::NotFound(story_id),
        other => other.into(),
    }
}
