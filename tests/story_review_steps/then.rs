//! Then steps for story review BDD scenarios.

use super::world::{StoryWorld, run_async};
use rstest_bdd_macros::then;
use storydesk::story::{
    domain::StoryStatus,
    services::{ErrorKind, StoryWorkflowError},
};

fn last_error(world: &StoryWorld) -> Result<&StoryWorkflowError, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(story)) => Err(eyre::eyre!(
            "expected the last operation to fail, story is {}",
            story.status()
        )),
        None => Err(eyre::eyre!("no operation recorded in scenario world")),
    }
}

#[then("the last operation succeeds")]
fn last_operation_succeeds(world: &StoryWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("unexpected failure: {err}")),
        None => Err(eyre::eyre!("no operation recorded in scenario world")),
    }
}

#[then("the last operation fails with an invalid transition")]
fn fails_with_invalid_transition(world: &StoryWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    if err.kind() != ErrorKind::InvalidTransition {
        return Err(eyre::eyre!("expected an invalid transition, got {err}"));
    }
    Ok(())
}

#[then("the last operation fails as unauthorized")]
fn fails_as_unauthorized(world: &StoryWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    if err.kind() != ErrorKind::Unauthorized {
        return Err(eyre::eyre!("expected an authorization failure, got {err}"));
    }
    Ok(())
}

#[then(r#""{viewer}" sees the story in status "{status}""#)]
fn sees_story_in_status(
    world: &StoryWorld,
    viewer: String,
    status: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&viewer)?;
    let expected = StoryStatus::try_from(status.as_str())?;
    let story = run_async(world.service.get_story(&actor, world.story_id()?))?;
    if story.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            story.status()
        ));
    }
    Ok(())
}

#[then(r#""{viewer}" cannot see the story"#)]
fn cannot_see_story(world: &StoryWorld, viewer: String) -> Result<(), eyre::Report> {
    let actor = world.actor(&viewer)?;
    let result = run_async(world.service.get_story(&actor, world.story_id()?));
    if !matches!(result, Err(StoryWorkflowError::NotFound(_))) {
        return Err(eyre::eyre!("expected the story to be hidden, got {result:?}"));
    }
    Ok(())
}

#[then(r#"the story is held by "{reviewer}""#)]
fn story_held_by(world: &StoryWorld, reviewer: String) -> Result<(), eyre::Report> {
    let actor = world.actor(&reviewer)?;
    let story = run_async(world.service.get_story(&actor, world.story_id()?))?;
    if story.reviewer_id() != Some(actor.id()) {
        return Err(eyre::eyre!(
            "expected {reviewer} to hold the story, reviewer is {:?}",
            story.reviewer_id()
        ));
    }
    Ok(())
}

#[then(r#""{reviewer}" has {count:u64} story counted in "{bucket}""#)]
fn story_counted_in_bucket(
    world: &StoryWorld,
    reviewer: String,
    count: u64,
    bucket: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&reviewer)?;
    let stats = run_async(world.service.get_status_counts(&actor))?;
    let actual = stats.get(&bucket);
    if actual != count {
        return Err(eyre::eyre!("expected {count} in {bucket}, found {actual}"));
    }
    Ok(())
}
