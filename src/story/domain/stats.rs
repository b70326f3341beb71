//! Role-scoped status aggregation for the dashboard overview.

use super::{Actor, Role, Story, StoryStatus, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket key for unclaimed waiting stories in the review queue.
pub const WAITING_UNASSIGNED: &str = "waiting_unassigned";
/// Bucket key for waiting stories queued for the current reviewer.
pub const WAITING_ASSIGNED_TO_ME: &str = "waiting_assigned_to_me";
/// Bucket key for stories the current reviewer is reviewing.
pub const IN_REVIEW_BY_ME: &str = "in_review_by_me";
/// Bucket key for stories the current reviewer has finished reviewing.
pub const TOTAL_REVIEWED_BY_ME: &str = "total_reviewed_by_me";

/// Set of stories a stats query ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsScope {
    /// Every live story, counted per status.
    All,
    /// Live stories by one author, counted per status.
    Author(UserId),
    /// Live stories counted against one reviewer's queue.
    Reviewer(UserId),
}

impl StatsScope {
    /// Returns the scope matching the actor's role.
    #[must_use]
    pub const fn for_actor(actor: &Actor) -> Self {
        match actor.role() {
            Role::Admin => Self::All,
            Role::Reviewer => Self::Reviewer(actor.id()),
            Role::Writer => Self::Author(actor.id()),
        }
    }
}

/// Per-status counts with every status present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts(BTreeMap<StoryStatus, u64>);

impl Default for StatusCounts {
    fn default() -> Self {
        Self(StoryStatus::ALL.iter().map(|status| (*status, 0)).collect())
    }
}

impl StatusCounts {
    /// Creates counts with every bucket at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds counts from `(status, count)` pairs; missing statuses are zero.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (StoryStatus, u64)>) -> Self {
        let mut counts = Self::default();
        for (status, count) in pairs {
            counts.0.insert(status, count);
        }
        counts
    }

    /// Returns the count for `status`.
    #[must_use]
    pub fn get(&self, status: StoryStatus) -> u64 {
        self.0.get(&status).copied().unwrap_or_default()
    }

    /// Returns the total across all statuses.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Iterates `(status, count)` pairs in canonical status order.
    pub fn iter(&self) -> impl Iterator<Item = (StoryStatus, u64)> + '_ {
        self.0.iter().map(|(status, count)| (*status, *count))
    }

    fn increment(&mut self, status: StoryStatus) {
        *self.0.entry(status).or_default() += 1;
    }

    /// Adds another set of counts bucket by bucket.
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        for (status, count) in other.iter() {
            *self.0.entry(status).or_default() += count;
        }
        self
    }
}

/// Counts shown to a reviewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQueueCounts {
    /// Waiting stories with no reviewer.
    pub waiting_unassigned: u64,
    /// Waiting stories queued for this reviewer.
    pub waiting_assigned_to_me: u64,
    /// Stories this reviewer is reviewing.
    pub in_review_by_me: u64,
    /// Stories this reviewer has reviewed, whatever the outcome.
    pub total_reviewed_by_me: u64,
}

/// Role-specific overview returned by the stats operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum StoryStats {
    /// Admin view over every story.
    AllStories(StatusCounts),
    /// Writer view over their own stories.
    MyStories(StatusCounts),
    /// Reviewer view over the review queue.
    ReviewQueue(ReviewQueueCounts),
}

impl StoryStats {
    /// Returns the widget heading for this view.
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self {
            Self::AllStories(_) => "All Stories Overview",
            Self::MyStories(_) => "My Stories Overview",
            Self::ReviewQueue(_) => "Review Queue Overview",
        }
    }

    /// Computes stats for `scope` in a single pass over `stories`.
    #[must_use]
    pub fn tally<'a>(scope: StatsScope, stories: impl IntoIterator<Item = &'a Story>) -> Self {
        let mut accumulator = StatsAccumulator::new(scope);
        for story in stories {
            accumulator.record(story);
        }
        accumulator.finish()
    }

    /// Returns the `(bucket, count)` pairs in display order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, u64)> {
        match self {
            Self::AllStories(counts) | Self::MyStories(counts) => counts
                .iter()
                .map(|(status, count)| (status.as_str(), count))
                .collect(),
            Self::ReviewQueue(queue) => vec![
                (WAITING_UNASSIGNED, queue.waiting_unassigned),
                (WAITING_ASSIGNED_TO_ME, queue.waiting_assigned_to_me),
                (IN_REVIEW_BY_ME, queue.in_review_by_me),
                (TOTAL_REVIEWED_BY_ME, queue.total_reviewed_by_me),
            ],
        }
    }

    /// Returns the count for `bucket`, or zero when the bucket is absent.
    #[must_use]
    pub fn get(&self, bucket: &str) -> u64 {
        self.entries()
            .into_iter()
            .find(|(key, _)| *key == bucket)
            .map_or(0, |(_, count)| count)
    }

    /// Returns the stats as a label-to-count map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, u64> {
        self.entries()
            .into_iter()
            .map(|(key, count)| (key.to_owned(), count))
            .collect()
    }

    /// Returns the per-status counts for admin and writer views.
    #[must_use]
    pub const fn status_counts(&self) -> Option<&StatusCounts> {
        match self {
            Self::AllStories(counts) | Self::MyStories(counts) => Some(counts),
            Self::ReviewQueue(_) => None,
        }
    }

    /// Returns the queue counts for the reviewer view.
    #[must_use]
    pub const fn review_queue(&self) -> Option<&ReviewQueueCounts> {
        match self {
            Self::ReviewQueue(queue) => Some(queue),
            Self::AllStories(_) | Self::MyStories(_) => None,
        }
    }
}

/// Single-pass fold of stories into [`StoryStats`].
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    scope: StatsScope,
    counts: StatusCounts,
    queue: ReviewQueueCounts,
}

impl StatsAccumulator {
    /// Creates an empty accumulator for `scope`.
    #[must_use]
    pub fn new(scope: StatsScope) -> Self {
        Self {
            scope,
            counts: StatusCounts::default(),
            queue: ReviewQueueCounts::default(),
        }
    }

    /// Folds one story into the counts. Deleted stories are skipped.
    pub fn record(&mut self, story: &Story) {
        if story.is_deleted() {
            return;
        }
        match self.scope {
            StatsScope::All => self.counts.increment(story.status()),
            StatsScope::Author(author) => {
                if story.author_id() == author {
                    self.counts.increment(story.status());
                }
            }
            StatsScope::Reviewer(reviewer) => record_queue(&mut self.queue, story, reviewer),
        }
    }

    /// Returns the accumulated stats.
    #[must_use]
    pub fn finish(self) -> StoryStats {
        match self.scope {
            StatsScope::All => StoryStats::AllStories(self.counts),
            StatsScope::Author(_) => StoryStats::MyStories(self.counts),
            StatsScope::Reviewer(_) => StoryStats::ReviewQueue(self.queue),
        }
    }
}

fn record_queue(queue: &mut ReviewQueueCounts, story: &Story, reviewer: UserId) {
    let mine = story.reviewer_id() == Some(reviewer);
    match story.status() {
        StoryStatus::WaitingForReview if story.reviewer_id().is_none() => {
            queue.waiting_unassigned += 1;
        }
        StoryStatus::WaitingForReview if mine => queue.waiting_assigned_to_me += 1,
        StoryStatus::InReview if mine => queue.in_review_by_me += 1,
        status if mine && status.is_reviewed() => queue.total_reviewed_by_me += 1,
        _ => {}
    }
}
