//! `PostgreSQL` adapters for story persistence.

mod models;
mod repository;
mod schema;

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::result::QueryResult;

pub use repository::{PostgresStoryRepository, StoryPgPool, build_pool};

/// SQL creating the `stories` table and its indexes.
pub const STORIES_SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-03-02-000000_create_stories/up.sql");

/// SQL adding the revision counter used by conditional writes.
pub const STORY_REVISION_SQL: &str =
    include_str!("../../../../migrations/2026-03-09-000000_add_story_revision/up.sql");

/// Applies every story migration on `connection`, oldest first. Safe to
/// run repeatedly.
///
/// # Errors
///
/// Returns the database error when a statement fails.
pub fn apply_schema(connection: &mut PgConnection) -> QueryResult<()> {
    for migration in [STORIES_SCHEMA_SQL, STORY_REVISION_SQL] {
        connection.batch_execute(migration)?;
    }
    Ok(())
}
