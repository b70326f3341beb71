//! Notification port fed with committed story events.

use crate::story::domain::StoryEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Consumer of story events.
///
/// Events are delivered after the mutation is persisted; a delivery
/// failure never rolls the mutation back.
#[async_trait]
pub trait StoryNotifier: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns [`StoryNotifierError`] when the event cannot be delivered.
    async fn notify(&self, event: &StoryEvent) -> Result<(), StoryNotifierError>;
}

/// Errors returned by notifier implementations.
#[derive(Debug, Clone, Error)]
pub enum StoryNotifierError {
    /// The event could not be delivered.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoryNotifierError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
