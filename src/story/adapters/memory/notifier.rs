//! Notifier that keeps delivered events for later inspection.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::story::{
    domain::StoryEvent,
    ports::{StoryNotifier, StoryNotifierError},
};

/// Thread-safe notifier recording every delivered event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<StoryEvent>>>,
}

impl RecordingNotifier {
    /// Creates a notifier with no recorded events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<StoryEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl StoryNotifier for RecordingNotifier {
    async fn notify(&self, event: &StoryEvent) -> Result<(), StoryNotifierError> {
        let mut events = self.events.lock().map_err(|err| {
            StoryNotifierError::delivery(std::io::Error::other(err.to_string()))
        })?;
        events.push(event.clone());
        Ok(())
    }
}
