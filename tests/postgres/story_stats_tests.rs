//! Aggregation tests comparing SQL stats with the in-memory tally.

use crate::postgres::helpers::{BoxError, PreparedRepo, persisted_story, prepared_repo};
use mockable::DefaultClock;
use rstest::rstest;
use storydesk::story::{
    domain::{
        Actor, DeletionConfirmation, IN_REVIEW_BY_ME, StatsScope, Story, StoryStats, StoryStatus,
        TOTAL_REVIEWED_BY_ME, UserId, WAITING_ASSIGNED_TO_ME, WAITING_UNASSIGNED,
    },
    ports::StoryRepository,
};

struct Seeded {
    stories: Vec<Story>,
    writers: [UserId; 2],
    reviewer: UserId,
}

async fn seed(ctx: &PreparedRepo) -> Result<Seeded, BoxError> {
    let admin = Actor::admin();
    let writers = [UserId::new(), UserId::new()];
    let [first, second] = writers;
    let reviewer = UserId::new();
    let rival = UserId::new();
    let mut stories = vec![
        persisted_story("Queue A", StoryStatus::WaitingForReview, first, None, 9),
        persisted_story("Queue B", StoryStatus::WaitingForReview, second, Some(reviewer), 8),
        persisted_story("Queue C", StoryStatus::WaitingForReview, second, Some(rival), 7),
        persisted_story("Desk A", StoryStatus::InReview, first, Some(reviewer), 6),
        persisted_story("Done A", StoryStatus::Approved, first, Some(reviewer), 5),
        persisted_story("Done B", StoryStatus::Rework, second, Some(reviewer), 4),
        persisted_story("Done C", StoryStatus::Completed, second, Some(rival), 3),
        persisted_story("Binned", StoryStatus::Rejected, first, Some(reviewer), 2),
    ];
    for story in &stories {
        ctx.repo.store(story).await?;
    }
    let binned = stories.pop().ok_or("seed is empty")?;
    let mut tombstoned = binned.clone();
    tombstoned.soft_delete(&admin, DeletionConfirmation::Confirmed, &DefaultClock)?;
    ctx.repo.compare_and_swap(binned.guard(), &tombstoned).await?;
    stories.push(tombstoned);
    Ok(Seeded {
        stories,
        writers,
        reviewer,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sql_stats_match_the_in_memory_tally(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = prepared_repo? else {
        return Ok(());
    };
    let seeded = seed(&ctx).await?;
    let [first, second] = seeded.writers;
    let scopes = [
        StatsScope::All,
        StatsScope::Author(first),
        StatsScope::Author(second),
        StatsScope::Reviewer(seeded.reviewer),
    ];

    for scope in scopes {
        let from_sql = ctx.repo.stats(scope).await?;
        let tallied = StoryStats::tally(scope, &seeded.stories);
        assert_eq!(from_sql, tallied, "scope {scope:?} diverged");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reviewer_queue_buckets(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = prepared_repo? else {
        return Ok(());
    };
    let seeded = seed(&ctx).await?;

    let queue = ctx.repo.stats(StatsScope::Reviewer(seeded.reviewer)).await?;

    assert_eq!(queue.get(WAITING_UNASSIGNED), 1);
    assert_eq!(queue.get(WAITING_ASSIGNED_TO_ME), 1);
    assert_eq!(queue.get(IN_REVIEW_BY_ME), 1);
    assert_eq!(queue.get(TOTAL_REVIEWED_BY_ME), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_counts_equal_the_sum_of_writer_counts(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = prepared_repo? else {
        return Ok(());
    };
    let seeded = seed(&ctx).await?;
    let [first, second] = seeded.writers;

    let all = ctx.repo.stats(StatsScope::All).await?;
    let first_counts = ctx.repo.stats(StatsScope::Author(first)).await?;
    let second_counts = ctx.repo.stats(StatsScope::Author(second)).await?;
    let summed = first_counts
        .status_counts()
        .zip(second_counts.status_counts())
        .map(|(left, right)| left.clone().merged(right))
        .ok_or("writer stats must carry status counts")?;

    assert_eq!(all.status_counts(), Some(&summed));
    assert_eq!(summed.total(), 7);
    Ok(())
}
