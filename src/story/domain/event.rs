//! Events emitted by successful story mutations.

use super::{ReviewOutcome, StoryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoryEventKind {
    /// A writer or admin submitted the story.
    Created,
    /// Title or content changed.
    Revised,
    /// An admin queued the story for a reviewer.
    ReviewerAssigned {
        /// Reviewer that now holds the story in their queue.
        reviewer_id: UserId,
    },
    /// A reviewer started reviewing.
    Claimed,
    /// A reviewer closed the review round.
    Resolved {
        /// Outcome chosen by the reviewer.
        outcome: ReviewOutcome,
    },
    /// An admin tombstoned the story.
    SoftDeleted,
    /// An admin cleared the tombstone.
    Restored,
    /// An admin removed the story permanently.
    Purged,
}

/// Record of a committed story mutation, handed to notifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEvent {
    /// Story the event refers to.
    pub story_id: StoryId,
    /// User that performed the mutation.
    pub actor_id: UserId,
    /// Kind of mutation.
    pub kind: StoryEventKind,
    /// Time the mutation was applied.
    pub occurred_at: DateTime<Utc>,
}

impl StoryEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(
        story_id: StoryId,
        actor_id: UserId,
        kind: StoryEventKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            story_id,
            actor_id,
            kind,
            occurred_at,
        }
    }

    /// Returns a short event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.kind {
            StoryEventKind::Created => "created",
            StoryEventKind::Revised => "revised",
            StoryEventKind::ReviewerAssigned { .. } => "reviewer_assigned",
            StoryEventKind::Claimed => "claimed",
            StoryEventKind::Resolved { .. } => "resolved",
            StoryEventKind::SoftDeleted => "soft_deleted",
            StoryEventKind::Restored => "restored",
            StoryEventKind::Purged => "purged",
        }
    }
}
