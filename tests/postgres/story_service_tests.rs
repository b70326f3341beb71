//! Workflow service tests running over the `PostgreSQL` repository.

use std::sync::Arc;

use crate::postgres::helpers::{BoxError, PreparedRepo, prepared_repo};
use mockable::DefaultClock;
use rstest::rstest;
use storydesk::story::{
    adapters::{
        logging::TracingNotifier,
        memory::InMemoryUserDirectory,
        postgres::PostgresStoryRepository,
    },
    domain::{Actor, DeletionConfirmation, ReviewOutcome, StoryFilter, StoryStatus},
    services::{ErrorKind, StoryWorkflowService},
};

type PgService = StoryWorkflowService<
    PostgresStoryRepository,
    InMemoryUserDirectory,
    TracingNotifier,
    DefaultClock,
>;

fn service_over(repo: PostgresStoryRepository) -> PgService {
    StoryWorkflowService::new(
        Arc::new(repo),
        Arc::new(InMemoryUserDirectory::new()),
        Arc::new(TracingNotifier::new()),
        Arc::new(DefaultClock),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_round_persists_across_calls(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> Result<(), BoxError> {
    let Some(PreparedRepo { repo, schema }) = prepared_repo? else {
        return Ok(());
    };
    let service = service_over(repo);
    let writer = Actor::writer();
    let reviewer = Actor::reviewer();

    let story = service
        .create_story(&writer, "Flood defences", "Walls raised by a metre.")
        .await?;
    service.claim_for_review(&reviewer, story.id()).await?;
    service
        .resolve_review(
            &reviewer,
            story.id(),
            ReviewOutcome::Approved,
            Some("solid sourcing".to_owned()),
        )
        .await?;
    let fetched = service.get_story(&writer, story.id()).await?;
    let approved = service
        .list_visible_stories(&writer, &StoryFilter::new().with_status(StoryStatus::Approved))
        .await?;

    assert_eq!(fetched.status(), StoryStatus::Approved);
    assert_eq!(fetched.feedback(), Some("solid sourcing"));
    assert_eq!(fetched.reviewer_id(), Some(reviewer.id()));
    assert_eq!(approved.len(), 1);
    drop(service);
    drop(schema);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_claims_have_one_winner(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> Result<(), BoxError> {
    let Some(PreparedRepo { repo, schema }) = prepared_repo? else {
        return Ok(());
    };
    let service = Arc::new(service_over(repo));
    let writer = Actor::writer();
    let story = service
        .create_story(&writer, "Council vote", "Budget passes by one vote.")
        .await?;
    let story_id = story.id();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .claim_for_review(&Actor::reviewer(), story_id)
                    .await
            })
        })
        .collect();
    let mut wins = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => wins += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::InvalidTransition, "{err}"),
        }
    }

    assert_eq!(wins, 1);
    drop(service);
    drop(schema);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn soft_delete_restore_and_purge(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> Result<(), BoxError> {
    let Some(PreparedRepo { repo, schema }) = prepared_repo? else {
        return Ok(());
    };
    let service = service_over(repo);
    let writer = Actor::writer();
    let admin = Actor::admin();
    let story = service
        .create_story(&writer, "Retracted poll", "Figures were wrong.")
        .await?;

    service
        .soft_delete(&admin, story.id(), DeletionConfirmation::Confirmed)
        .await?;
    let hidden = service.get_story(&writer, story.id()).await;
    let restored = service.restore(&admin, story.id()).await?;
    service
        .soft_delete(&admin, story.id(), DeletionConfirmation::Confirmed)
        .await?;
    service.purge(&admin, story.id()).await?;
    let purged = service.get_story(&admin, story.id()).await;

    assert!(matches!(hidden, Err(err) if err.kind() == ErrorKind::NotFound));
    assert_eq!(restored.status(), StoryStatus::WaitingForReview);
    assert!(!restored.is_deleted());
    assert!(matches!(purged, Err(err) if err.kind() == ErrorKind::NotFound));
    drop(service);
    drop(schema);
    Ok(())
}
