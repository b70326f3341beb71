//! Shared test helpers for `PostgreSQL` integration tests.

use chrono::{Duration, SubsecRound, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use rstest::fixture;
use storydesk::story::{
    adapters::postgres::{PostgresStoryRepository, apply_schema},
    domain::{PersistedStoryData, Story, StoryId, StoryStatus, UserId},
};
use uuid::Uuid;

/// Boxed error type for fixtures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming the test server.
pub const TEST_DATABASE_URL: &str = "STORYDESK_TEST_DATABASE_URL";

const POOL_SIZE: u32 = 4;

/// Pins every pooled connection to the test schema.
#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Throwaway schema dropped when the value goes out of scope.
pub struct TestSchema {
    url: String,
    name: String,
}

impl TestSchema {
    fn create(url: &str) -> Result<Self, BoxError> {
        let name = format!("storydesk_test_{}", Uuid::new_v4().simple());
        let mut conn = PgConnection::establish(url)?;
        conn.batch_execute(&format!("CREATE SCHEMA {name}; SET search_path TO {name};"))?;
        apply_schema(&mut conn)?;
        Ok(Self {
            url: url.to_owned(),
            name,
        })
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        let dropped = PgConnection::establish(&self.url).map(|mut conn| {
            conn.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name))
        });
        if !matches!(dropped, Ok(Ok(()))) {
            eprintln!("failed to drop test schema {}", self.name);
        }
    }
}

/// Repository bound to a fresh schema.
pub struct PreparedRepo {
    /// Repository under test.
    pub repo: PostgresStoryRepository,
    /// Schema backing the repository. Dropped after the pool.
    pub schema: TestSchema,
}

/// Creates a repository on a fresh schema, or `None` when no test server is
/// configured.
///
/// # Errors
///
/// Returns an error if the schema or the pool cannot be created.
pub fn prepare_repository() -> Result<Option<PreparedRepo>, BoxError> {
    let Some(url) = std::env::var(TEST_DATABASE_URL).ok() else {
        eprintln!("{TEST_DATABASE_URL} is unset; skipping PostgreSQL test");
        return Ok(None);
    };
    let schema = TestSchema::create(&url)?;
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .connection_customizer(Box::new(SearchPath(schema.name().to_owned())))
        .build(ConnectionManager::<PgConnection>::new(url))?;
    Ok(Some(PreparedRepo {
        repo: PostgresStoryRepository::new(pool),
        schema,
    }))
}

/// Fixture form of [`prepare_repository`].
#[fixture]
pub fn prepared_repo() -> Result<Option<PreparedRepo>, BoxError> {
    prepare_repository()
}

/// Builds a persisted story with timestamps at database precision.
#[must_use]
pub fn persisted_story(
    title: &str,
    status: StoryStatus,
    author: UserId,
    reviewer: Option<UserId>,
    age_minutes: i64,
) -> Story {
    let created_at = (Utc::now() - Duration::minutes(age_minutes)).trunc_subsecs(6);
    Story::from_persisted(PersistedStoryData {
        id: StoryId::new(),
        title: title.to_owned(),
        content: "Copy filed from the harbour office.".to_owned(),
        status,
        author_id: author,
        reviewer_id: reviewer,
        feedback: None,
        created_at,
        updated_at: created_at,
        deleted_at: None,
        revision: 0,
    })
}
