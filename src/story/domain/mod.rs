//! Domain model for the story review workflow.
//!
//! The story domain models submission, review claiming and resolution,
//! soft deletion and role-scoped aggregation while keeping persistence,
//! identity and notification concerns outside of the domain boundary.

mod actor;
mod error;
mod event;
mod filter;
mod ids;
mod rules;
mod stats;
mod status;
mod story;

pub use actor::{Actor, Capability, Role};
pub use error::{ParseRoleError, ParseStoryStatusError, StoryDomainError, StoryValidationError};
pub use event::{StoryEvent, StoryEventKind};
pub use filter::{StoryFilter, StoryQuery, TrashedFilter};
pub use ids::{StoryId, UserId};
pub use rules::{DEFAULT_MAX_TITLE_LENGTH, MAX_TITLE_COLUMN_WIDTH, WorkflowRules};
pub use stats::{
    IN_REVIEW_BY_ME, ReviewQueueCounts, StatsAccumulator, StatsScope, StatusCounts, StoryStats,
    TOTAL_REVIEWED_BY_ME, WAITING_ASSIGNED_TO_ME, WAITING_UNASSIGNED,
};
pub use status::{BadgeColor, ReviewOutcome, StoryStatus};
pub use story::{
    DeletionConfirmation, PersistedStoryData, Resolution, Story, StoryDraft, StoryGuard,
};
