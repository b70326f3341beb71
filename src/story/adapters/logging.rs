//! Notifier that records story events as structured log lines.

use crate::story::{
    domain::{StoryEvent, StoryEventKind},
    ports::{StoryNotifier, StoryNotifierError},
};
use async_trait::async_trait;

/// Writes every story event to the `storydesk::events` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a tracing notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoryNotifier for TracingNotifier {
    async fn notify(&self, event: &StoryEvent) -> Result<(), StoryNotifierError> {
        match event.kind {
            StoryEventKind::Resolved { outcome } => tracing::info!(
                target: "storydesk::events",
                event = event.name(),
                story_id = %event.story_id,
                actor_id = %event.actor_id,
                outcome = outcome.as_str(),
                occurred_at = %event.occurred_at,
                "story event"
            ),
            StoryEventKind::ReviewerAssigned { reviewer_id } => tracing::info!(
                target: "storydesk::events",
                event = event.name(),
                story_id = %event.story_id,
                actor_id = %event.actor_id,
                reviewer_id = %reviewer_id,
                occurred_at = %event.occurred_at,
                "story event"
            ),
            _ => tracing::info!(
                target: "storydesk::events",
                event = event.name(),
                story_id = %event.story_id,
                actor_id = %event.actor_id,
                occurred_at = %event.occurred_at,
                "story event"
            ),
        }
        Ok(())
    }
}
