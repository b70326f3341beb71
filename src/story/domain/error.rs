//! Error types for story domain validation, authorization and parsing.

use super::{Capability, ReviewOutcome, Role, StoryId, UserId};
use thiserror::Error;

/// Payload validation failures surfaced to the actor for correction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoryValidationError {
    /// The story title is empty after trimming.
    #[error("story title must not be empty")]
    EmptyTitle,

    /// The story title exceeds the configured character limit.
    #[error("story title has {actual} characters, limit is {max}")]
    TitleTooLong {
        /// Configured maximum length in characters.
        max: usize,
        /// Length of the submitted title in characters.
        actual: usize,
    },

    /// The story content is empty after trimming.
    #[error("story content must not be empty")]
    EmptyContent,

    /// A review outcome was submitted without feedback.
    #[error("feedback is required when marking a story {0}")]
    MissingFeedback(ReviewOutcome),

    /// A soft delete was requested without confirmation.
    #[error("story deletion must be confirmed")]
    DeletionNotConfirmed,

    /// The user chosen as reviewer does not hold the reviewer role.
    #[error("user {0} is not a reviewer")]
    NotAReviewer(UserId),

    /// The referenced user is unknown to the directory.
    #[error("unknown user {0}")]
    UnknownUser(UserId),
}

/// Errors returned by story domain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoryDomainError {
    /// A payload field is missing or malformed.
    #[error(transparent)]
    Validation(#[from] StoryValidationError),

    /// The actor's role lacks the capability for the operation.
    #[error("role {role} may not {capability}")]
    Unauthorized {
        /// Role held by the actor.
        role: Role,
        /// Capability that was requested.
        capability: Capability,
    },

    /// A reviewer acted on a story assigned to another reviewer.
    #[error("story {story_id} is not assigned to reviewer {actor}")]
    OwnershipViolation {
        /// Story the actor tried to act on.
        story_id: StoryId,
        /// Reviewer that attempted the action.
        actor: UserId,
    },

    /// The requested transition is not part of the workflow.
    #[error("invalid transition for story {story_id}: {from} -> {to}")]
    InvalidTransition {
        /// Story the transition was attempted on.
        story_id: StoryId,
        /// Current lifecycle position in canonical string form.
        from: String,
        /// Requested lifecycle position in canonical string form.
        to: String,
    },
}

/// Error returned while parsing story status labels.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown story status: {0}")]
pub struct ParseStoryStatusError(pub String);

/// Error returned while parsing role names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
