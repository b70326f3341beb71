//! Concurrency tests: racing reviewers and admins against one story.

use std::sync::Arc;

use super::helpers::{Newsdesk, newsdesk};
use eyre::ensure;
use rstest::rstest;
use storydesk::story::{
    domain::{Actor, DeletionConfirmation, StoryEventKind, StoryStatus},
    services::ErrorKind,
};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn eight_reviewers_race_for_one_claim(newsdesk: Newsdesk) -> eyre::Result<()> {
    let writer = Actor::writer();
    let story = newsdesk
        .service
        .create_story(&writer, "Council vote", "Budget passes by one vote.")
        .await?;
    let story_id = story.id();
    let service = Arc::new(newsdesk.service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let reviewer = Actor::reviewer();
            tokio::spawn(async move {
                let outcome = service.claim_for_review(&reviewer, story_id).await;
                (reviewer, outcome)
            })
        })
        .collect();
    let mut winners = Vec::new();
    for handle in handles {
        let (reviewer, outcome) = handle.await?;
        match outcome {
            Ok(_) => winners.push(reviewer),
            Err(err) => ensure!(
                err.kind() == ErrorKind::InvalidTransition,
                "losing claim failed with {err}"
            ),
        }
    }

    ensure!(winners.len() == 1, "expected one winner, got {}", winners.len());
    let stored = service.get_story(&writer, story_id).await?;
    ensure!(stored.status() == StoryStatus::InReview);
    ensure!(stored.reviewer_id() == winners.first().map(Actor::id));
    let claims = newsdesk
        .notifier
        .events()
        .into_iter()
        .filter(|event| event.kind == StoryEventKind::Claimed)
        .count();
    ensure!(claims == 1, "expected one claim event, got {claims}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deletes_leave_one_tombstone(newsdesk: Newsdesk) -> eyre::Result<()> {
    let writer = Actor::writer();
    let admin = Actor::admin();
    let story = newsdesk
        .service
        .create_story(&writer, "Retracted poll", "Figures were wrong.")
        .await?;
    let story_id = story.id();
    let service = Arc::new(newsdesk.service);

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .soft_delete(&admin, story_id, DeletionConfirmation::Confirmed)
                .await
        })
    };
    let second = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .soft_delete(&admin, story_id, DeletionConfirmation::Confirmed)
                .await
        })
    };
    let outcomes = [first.await?, second.await?];

    let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    ensure!(succeeded == 1, "expected one delete to win, got {succeeded}");
    ensure!(outcomes.iter().any(|outcome| matches!(
        outcome,
        Err(err) if err.kind() == ErrorKind::InvalidTransition
    )));
    let stored = service.get_story(&admin, story_id).await?;
    ensure!(stored.is_deleted());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn revise_racing_a_claim_loses_neither_write(newsdesk: Newsdesk) -> eyre::Result<()> {
    let writer = Actor::writer();
    let reviewer = Actor::reviewer();
    let story = newsdesk
        .service
        .create_story(&writer, "Ferry fraes", "Fares rise in spring.")
        .await?;
    let story_id = story.id();
    let service = Arc::new(newsdesk.service);

    let revise = {
        let desk = Arc::clone(&service);
        tokio::spawn(async move {
            desk.revise_story(&writer, story_id, "Ferry fares", "Fares rise in spring.")
                .await
        })
    };
    let claim = {
        let desk = Arc::clone(&service);
        tokio::spawn(async move { desk.claim_for_review(&reviewer, story_id).await })
    };
    let revised = revise.await?;
    let claimed = claim.await?;

    for outcome in [revised.as_ref().map(|_| ()), claimed.as_ref().map(|_| ())] {
        if let Err(err) = outcome {
            ensure!(
                err.kind() == ErrorKind::InvalidTransition,
                "losing write failed with {err}"
            );
        }
    }
    ensure!(revised.is_ok() || claimed.is_ok(), "one write must commit");
    let stored = service.get_story(&writer, story_id).await?;
    let expected_title = if revised.is_ok() { "Ferry fares" } else { "Ferry fraes" };
    ensure!(stored.title() == expected_title, "title is {}", stored.title());
    if claimed.is_ok() {
        ensure!(stored.status() == StoryStatus::InReview);
        ensure!(stored.reviewer_id() == Some(reviewer.id()));
    } else {
        ensure!(stored.status() == StoryStatus::WaitingForReview);
        ensure!(stored.reviewer_id().is_none());
    }
    let commits = [revised.is_ok(), claimed.is_ok()]
        .into_iter()
        .filter(|ok| *ok)
        .count();
    ensure!(stored.revision() == story.revision() + u64::try_from(commits)?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn revise_racing_a_soft_delete_loses_neither_write(
    newsdesk: Newsdesk,
) -> eyre::Result<()> {
    let writer = Actor::writer();
    let editor = Actor::admin();
    let admin = Actor::admin();
    let story = newsdesk
        .service
        .create_story(&writer, "Retracted pol", "Figures were wrong.")
        .await?;
    let story_id = story.id();
    let service = Arc::new(newsdesk.service);

    let revise = {
        let desk = Arc::clone(&service);
        tokio::spawn(async move {
            desk.revise_story(&editor, story_id, "Retracted poll", "Figures were wrong.")
                .await
        })
    };
    let delete = {
        let desk = Arc::clone(&service);
        tokio::spawn(async move {
            desk.soft_delete(&admin, story_id, DeletionConfirmation::Confirmed)
                .await
        })
    };
    let revised = revise.await?;
    let deleted = delete.await?;

    for outcome in [revised.as_ref().map(|_| ()), deleted.as_ref().map(|_| ())] {
        if let Err(err) = outcome {
            ensure!(
                err.kind() == ErrorKind::InvalidTransition,
                "losing write failed with {err}"
            );
        }
    }
    ensure!(revised.is_ok() || deleted.is_ok(), "one write must commit");
    let stored = service.get_story(&admin, story_id).await?;
    let expected_title = if revised.is_ok() { "Retracted poll" } else { "Retracted pol" };
    ensure!(stored.title() == expected_title, "title is {}", stored.title());
    ensure!(stored.is_deleted() == deleted.is_ok());
    Ok(())
}
