//! Story aggregate root and the review workflow operations on it.
//!
//! Every mutating method validates the whole request before touching any
//! field, so a returned error always leaves the story unchanged. Checks run
//! in a fixed order: workflow position, role capability, ownership, payload.

use super::{
    Actor, Capability, ReviewOutcome, Role, StoryDomainError, StoryEvent, StoryEventKind,
    StoryId, StoryStatus, StoryValidationError, UserId, WorkflowRules,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Lifecycle position reported for tombstoned stories.
const DELETED_POSITION: &str = "deleted";

/// Validated title and content submitted through the story form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    title: String,
    content: String,
}

impl StoryDraft {
    /// Validates a title and content pair.
    ///
    /// The title is trimmed before its length is measured in characters.
    ///
    /// # Errors
    ///
    /// Returns [`StoryValidationError`] when the title is empty or too long,
    /// or when the content is blank.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        rules: &WorkflowRules,
    ) -> Result<Self, StoryValidationError> {
        let raw_title = title.into();
        let normalized_title = raw_title.trim();
        if normalized_title.is_empty() {
            return Err(StoryValidationError::EmptyTitle);
        }
        let title_length = normalized_title.chars().count();
        if title_length > rules.max_title_length {
            return Err(StoryValidationError::TitleTooLong {
                max: rules.max_title_length,
                actual: title_length,
            });
        }

        let content = content.into();
        if content.trim().is_empty() {
            return Err(StoryValidationError::EmptyContent);
        }

        Ok(Self {
            title: normalized_title.to_owned(),
            content,
        })
    }

    /// Returns the normalized title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Reviewer decision closing a review round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    outcome: ReviewOutcome,
    feedback: Option<String>,
}

impl Resolution {
    /// Creates a resolution. Feedback is validated when it is applied.
    #[must_use]
    pub const fn new(outcome: ReviewOutcome, feedback: Option<String>) -> Self {
        Self { outcome, feedback }
    }

    /// Returns the chosen outcome.
    #[must_use]
    pub const fn outcome(&self) -> ReviewOutcome {
        self.outcome
    }

    fn into_feedback(self, rules: &WorkflowRules) -> Result<Option<String>, StoryValidationError> {
        let feedback = self
            .feedback
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        let required = !matches!(self.outcome, ReviewOutcome::Approved)
            || rules.require_approval_feedback;
        if required && feedback.is_none() {
            return Err(StoryValidationError::MissingFeedback(self.outcome));
        }
        Ok(feedback)
    }
}

/// Explicit confirmation accompanying a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionConfirmation {
    /// The admin confirmed the deletion prompt.
    Confirmed,
    /// The deletion prompt was not confirmed.
    Unconfirmed,
}

impl From<bool> for DeletionConfirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// Fields a conditional write is keyed on.
///
/// A write succeeds only when the stored story still matches the guard
/// captured when it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoryGuard {
    /// Expected workflow status.
    pub status: StoryStatus,
    /// Expected reviewer assignment.
    pub reviewer_id: Option<UserId>,
    /// Expected tombstone presence.
    pub deleted: bool,
    /// Expected revision. Every committed mutation advances it.
    pub revision: u64,
}

/// Story aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    id: StoryId,
    title: String,
    content: String,
    status: StoryStatus,
    author_id: UserId,
    reviewer_id: Option<UserId>,
    feedback: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    revision: u64,
}

/// Parameter object for reconstructing a persisted story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedStoryData {
    /// Persisted story identifier.
    pub id: StoryId,
    /// Persisted title.
    pub title: String,
    /// Persisted content.
    pub content: String,
    /// Persisted workflow status.
    pub status: StoryStatus,
    /// Persisted author.
    pub author_id: UserId,
    /// Persisted reviewer, if any.
    pub reviewer_id: Option<UserId>,
    /// Persisted reviewer feedback, if any.
    pub feedback: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted tombstone, if any.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Persisted revision counter.
    pub revision: u64,
}

impl Story {
    /// Submits a new story on behalf of `actor`.
    ///
    /// The story starts waiting for review with no reviewer.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::Unauthorized`] when the actor may not
    /// create stories.
    pub fn submit(
        actor: &Actor,
        draft: StoryDraft,
        clock: &impl Clock,
    ) -> Result<Self, StoryDomainError> {
        actor.authorize(Capability::CreateStory)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: StoryId::new(),
            title: draft.title,
            content: draft.content,
            status: StoryStatus::WaitingForReview,
            author_id: actor.id(),
            reviewer_id: None,
            feedback: None,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
            revision: 0,
        })
    }

    /// Reconstructs a story from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedStoryData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            content: data.content,
            status: data.status,
            author_id: data.author_id,
            reviewer_id: data.reviewer_id,
            feedback: data.feedback,
            created_at: data.created_at,
            updated_at: data.updated_at,
            deleted_at: data.deleted_at,
            revision: data.revision,
        }
    }

    /// Returns the story identifier.
    #[must_use]
    pub const fn id(&self) -> StoryId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> StoryStatus {
        self.status
    }

    /// Returns the author.
    #[must_use]
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Returns the assigned reviewer, if any.
    #[must_use]
    pub const fn reviewer_id(&self) -> Option<UserId> {
        self.reviewer_id
    }

    /// Returns the reviewer feedback, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the tombstone timestamp, if the story is soft-deleted.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns the revision counter.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns whether the story is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the guard a conditional write of this story must match.
    #[must_use]
    pub const fn guard(&self) -> StoryGuard {
        StoryGuard {
            status: self.status,
            reviewer_id: self.reviewer_id,
            deleted: self.is_deleted(),
            revision: self.revision,
        }
    }

    /// Returns the lifecycle position used in transition errors.
    #[must_use]
    pub const fn position(&self) -> &'static str {
        if self.is_deleted() {
            DELETED_POSITION
        } else {
            self.status.as_str()
        }
    }

    /// Starts a review on behalf of `actor`.
    ///
    /// Returns `Ok(None)` when the actor already holds the review, leaving
    /// the story untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] unless the story is
    /// waiting for review, [`StoryDomainError::Unauthorized`] for non
    /// reviewers and [`StoryDomainError::OwnershipViolation`] when another
    /// reviewer holds the story.
    pub fn claim(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<Option<StoryEvent>, StoryDomainError> {
        if self.is_held_by(actor) {
            return Ok(None);
        }
        self.ensure_workflow_transition(StoryStatus::InReview)?;
        actor.authorize(Capability::ClaimReview)?;
        if self.reviewer_id.is_some_and(|reviewer| reviewer != actor.id()) {
            return Err(self.ownership_violation(actor));
        }

        self.status = StoryStatus::InReview;
        self.reviewer_id = Some(actor.id());
        Ok(Some(self.record(actor, StoryEventKind::Claimed, clock)))
    }

    /// Closes the review round held by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] unless the story is in
    /// review, [`StoryDomainError::Unauthorized`] for non reviewers,
    /// [`StoryDomainError::OwnershipViolation`] when the actor is not the
    /// assigned reviewer and [`StoryDomainError::Validation`] when required
    /// feedback is missing.
    pub fn resolve(
        &mut self,
        actor: &Actor,
        resolution: Resolution,
        rules: &WorkflowRules,
        clock: &impl Clock,
    ) -> Result<StoryEvent, StoryDomainError> {
        let outcome = resolution.outcome();
        self.ensure_workflow_transition(outcome.status())?;
        actor.authorize(Capability::ResolveReview)?;
        if self.reviewer_id != Some(actor.id()) {
            return Err(self.ownership_violation(actor));
        }
        let feedback = resolution.into_feedback(rules)?;

        self.status = outcome.status();
        self.feedback = feedback;
        Ok(self.record(actor, StoryEventKind::Resolved { outcome }, clock))
    }

    /// Moves the story to `target`, dispatching to [`Self::claim`] or
    /// [`Self::resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] for targets that no
    /// workflow edge leads to, plus any error of the dispatched operation.
    pub fn transition_to(
        &mut self,
        actor: &Actor,
        target: StoryStatus,
        feedback: Option<String>,
        rules: &WorkflowRules,
        clock: &impl Clock,
    ) -> Result<Option<StoryEvent>, StoryDomainError> {
        if target == StoryStatus::InReview {
            return self.claim(actor, clock);
        }
        match ReviewOutcome::from_status(target) {
            Some(outcome) => self
                .resolve(actor, Resolution::new(outcome, feedback), rules, clock)
                .map(Some),
            None => Err(self.invalid_transition(target.as_str())),
        }
    }

    /// Replaces title and content.
    ///
    /// Status, reviewer and feedback are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] when the story is
    /// soft-deleted, [`StoryDomainError::Unauthorized`] when the role may not
    /// edit stories and [`StoryDomainError::OwnershipViolation`] when a
    /// writer edits someone else's story.
    pub fn revise(
        &mut self,
        actor: &Actor,
        draft: StoryDraft,
        clock: &impl Clock,
    ) -> Result<StoryEvent, StoryDomainError> {
        self.ensure_editable(actor)?;

        self.title = draft.title;
        self.content = draft.content;
        Ok(self.record(actor, StoryEventKind::Revised, clock))
    }

    /// Checks that `actor` may edit this story, before any payload is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::revise`].
    pub fn ensure_editable(&self, actor: &Actor) -> Result<(), StoryDomainError> {
        if self.is_deleted() {
            return Err(self.invalid_transition("revised"));
        }
        actor.authorize(Capability::EditStory)?;
        if actor.role() == Role::Writer && actor.id() != self.author_id {
            return Err(self.ownership_violation(actor));
        }
        Ok(())
    }

    /// Places a waiting story in `reviewer`'s queue without starting the
    /// review.
    ///
    /// The caller is responsible for checking that `reviewer` holds the
    /// reviewer role.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] unless the story is
    /// waiting for review and [`StoryDomainError::Unauthorized`] for non
    /// admins.
    pub fn assign_reviewer(
        &mut self,
        actor: &Actor,
        reviewer: UserId,
        clock: &impl Clock,
    ) -> Result<StoryEvent, StoryDomainError> {
        if self.is_deleted() || self.status != StoryStatus::WaitingForReview {
            return Err(self.invalid_transition("assigned"));
        }
        actor.authorize(Capability::AssignReviewer)?;

        self.reviewer_id = Some(reviewer);
        Ok(self.record(
            actor,
            StoryEventKind::ReviewerAssigned {
                reviewer_id: reviewer,
            },
            clock,
        ))
    }

    /// Tombstones the story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] when the story is
    /// already deleted, [`StoryDomainError::Unauthorized`] for non admins and
    /// [`StoryValidationError::DeletionNotConfirmed`] without confirmation.
    pub fn soft_delete(
        &mut self,
        actor: &Actor,
        confirmation: DeletionConfirmation,
        clock: &impl Clock,
    ) -> Result<StoryEvent, StoryDomainError> {
        if self.is_deleted() {
            return Err(self.invalid_transition(DELETED_POSITION));
        }
        actor.authorize(Capability::DeleteStory)?;
        if confirmation != DeletionConfirmation::Confirmed {
            return Err(StoryValidationError::DeletionNotConfirmed.into());
        }

        let event = self.record(actor, StoryEventKind::SoftDeleted, clock);
        self.deleted_at = Some(event.occurred_at);
        Ok(event)
    }

    /// Clears the tombstone.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] when the story is not
    /// deleted and [`StoryDomainError::Unauthorized`] for non admins.
    pub fn restore(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<StoryEvent, StoryDomainError> {
        if !self.is_deleted() {
            return Err(self.invalid_transition("active"));
        }
        actor.authorize(Capability::RestoreStory)?;

        self.deleted_at = None;
        Ok(self.record(actor, StoryEventKind::Restored, clock))
    }

    /// Checks that the story may be purged by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::InvalidTransition`] when the story is not
    /// deleted and [`StoryDomainError::Unauthorized`] for non admins.
    pub fn ensure_purgeable(
        &self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<StoryEvent, StoryDomainError> {
        if !self.is_deleted() {
            return Err(self.invalid_transition("purged"));
        }
        actor.authorize(Capability::PurgeStory)?;
        Ok(StoryEvent::new(
            self.id,
            actor.id(),
            StoryEventKind::Purged,
            clock.utc(),
        ))
    }

    fn is_held_by(&self, actor: &Actor) -> bool {
        actor.role() == Role::Reviewer
            && !self.is_deleted()
            && self.status == StoryStatus::InReview
            && self.reviewer_id == Some(actor.id())
    }

    fn ensure_workflow_transition(&self, target: StoryStatus) -> Result<(), StoryDomainError> {
        if self.is_deleted() || !self.status.can_transition_to(target) {
            return Err(self.invalid_transition(target.as_str()));
        }
        Ok(())
    }

    fn invalid_transition(&self, to: &str) -> StoryDomainError {
        StoryDomainError::InvalidTransition {
            story_id: self.id,
            from: self.position().to_owned(),
            to: to.to_owned(),
        }
    }

    const fn ownership_violation(&self, actor: &Actor) -> StoryDomainError {
        StoryDomainError::OwnershipViolation {
            story_id: self.id,
            actor: actor.id(),
        }
    }

    /// Advances the revision, stamps `updated_at` and describes the
    /// mutation.
    fn record(&mut self, actor: &Actor, kind: StoryEventKind, clock: &impl Clock) -> StoryEvent {
        self.revision = self.revision.saturating_add(1);
        self.updated_at = clock.utc();
        StoryEvent::new(self.id, actor.id(), kind, self.updated_at)
    }
}
