//! Builders shared by the story unit tests.

use crate::story::domain::{PersistedStoryData, Story, StoryId, StoryStatus, UserId};
use chrono::Utc;

/// Builds a live story in `status` with the given reviewer.
pub fn story_in(status: StoryStatus, author: UserId, reviewer: Option<UserId>) -> Story {
    let now = Utc::now();
    Story::from_persisted(PersistedStoryData {
        id: StoryId::new(),
        title: "Harbour strike enters second week".to_owned(),
        content: "Dock workers rallied outside the port authority.".to_owned(),
        status,
        author_id: author,
        reviewer_id: reviewer,
        feedback: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        revision: 0,
    })
}
