//! `PostgreSQL` repository implementation for story storage.

use super::{
    models::{NewStoryRow, ReviewQueueRow, StatusCountRow, StoryRow},
    schema::stories,
};
use crate::story::{
    domain::{
        PersistedStoryData, ReviewQueueCounts, StatsScope, StatusCounts, Story, StoryGuard,
        StoryId, StoryQuery, StoryStats, StoryStatus, TrashedFilter, UserId,
    },
    ports::{StoryRepository, StoryRepositoryError, StoryRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Timestamptz, Uuid as SqlUuid};

/// `PostgreSQL` connection pool type used by story adapters.
pub type StoryPgPool = Pool<ConnectionManager<PgConnection>>;

const COMPARE_AND_SWAP_SQL: &str = concat!(
    "UPDATE stories SET title = $1, content = $2, status = $3, reviewer_id = $4, ",
    "feedback = $5, updated_at = $6, deleted_at = $7, revision = $8 ",
    "WHERE id = $9 AND status = $10 AND reviewer_id IS NOT DISTINCT FROM $11 ",
    "AND (deleted_at IS NOT NULL) = $12 AND revision = $13",
);

const STATUS_COUNTS_SQL: &str = concat!(
    "SELECT ",
    "COUNT(*) FILTER (WHERE status = 'waiting_for_review') AS waiting_for_review, ",
    "COUNT(*) FILTER (WHERE status = 'in_review') AS in_review, ",
    "COUNT(*) FILTER (WHERE status = 'approved') AS approved, ",
    "COUNT(*) FILTER (WHERE status = 'rejected') AS rejected, ",
    "COUNT(*) FILTER (WHERE status = 'rework') AS rework, ",
    "COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled, ",
    "COUNT(*) FILTER (WHERE status = 'completed') AS completed ",
    "FROM stories WHERE deleted_at IS NULL ",
    "AND ($1::uuid IS NULL OR author_id = $1)",
);

const REVIEW_QUEUE_SQL: &str = concat!(
    "SELECT ",
    "COUNT(*) FILTER (WHERE status = 'waiting_for_review' AND reviewer_id IS NULL) ",
    "AS waiting_unassigned, ",
    "COUNT(*) FILTER (WHERE status = 'waiting_for_review' AND reviewer_id = $1) ",
    "AS waiting_assigned_to_me, ",
    "COUNT(*) FILTER (WHERE status = 'in_review' AND reviewer_id = $1) ",
    "AS in_review_by_me, ",
    "COUNT(*) FILTER (WHERE reviewer_id = $1 AND status IN ",
    "('approved', 'rejected', 'cancelled', 'rework', 'completed')) ",
    "AS total_reviewed_by_me ",
    "FROM stories WHERE deleted_at IS NULL",
);

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns the pool error when no initial connection can be established.
pub fn build_pool(database_url: &str, max_connections: u32) -> Result<StoryPgPool, PoolError> {
    Pool::builder()
        .max_size(max_connections)
        .build(ConnectionManager::new(database_url))
}

/// `PostgreSQL`-backed story repository.
#[derive(Debug, Clone)]
pub struct PostgresStoryRepository {
    pool: StoryPgPool,
}

impl PostgresStoryRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: StoryPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoryRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoryRepositoryError::persistence)?
    }
}

#[async_trait]
impl StoryRepository for PostgresStoryRepository {
    async fn store(&self, story: &Story) -> StoryRepositoryResult<()> {
        let story_id = story.id();
        let new_row = to_new_row(story)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(stories::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoryRepositoryError::DuplicateStory(story_id)
                    }
                    _ => StoryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: StoryId) -> StoryRepositoryResult<Option<Story>> {
        self.run_blocking(move |connection| {
            let row = find_row(connection, id)?;
            row.map(row_to_story).transpose()
        })
        .await
    }

    async fn list(&self, query: &StoryQuery) -> StoryRepositoryResult<Vec<Story>> {
        let lookup = query.clone();
        self.run_blocking(move |connection| {
            let mut statement = stories::table.select(StoryRow::as_select()).into_boxed();
            if let Some(author_id) = lookup.author_id {
                statement = statement.filter(stories::author_id.eq(author_id.into_inner()));
            }
            if let Some(status) = lookup.status {
                statement = statement.filter(stories::status.eq(status.as_str()));
            }
            if let Some(term) = lookup.search.as_deref() {
                statement = statement.filter(stories::title.ilike(like_pattern(term)));
            }
            statement = match lookup.trashed {
                TrashedFilter::Without => statement.filter(stories::deleted_at.is_null()),
                TrashedFilter::Only => statement.filter(stories::deleted_at.is_not_null()),
                TrashedFilter::With => statement,
            };

            let rows = statement
                .order((stories::created_at.asc(), stories::id.asc()))
                .load::<StoryRow>(connection)
                .map_err(StoryRepositoryError::persistence)?;
            rows.into_iter().map(row_to_story).collect()
        })
        .await
    }

    async fn compare_and_swap(
        &self,
        expected: StoryGuard,
        story: &Story,
    ) -> StoryRepositoryResult<()> {
        let story_id = story.id();
        let row = to_new_row(story)?;
        let expected_revision = to_revision(expected.revision)?;

        self.run_blocking(move |connection| {
            let affected = diesel::sql_query(COMPARE_AND_SWAP_SQL)
                .bind::<Text, _>(row.title)
                .bind::<Text, _>(row.content)
                .bind::<Text, _>(row.status)
                .bind::<Nullable<SqlUuid>, _>(row.reviewer_id)
                .bind::<Nullable<Text>, _>(row.feedback)
                .bind::<Timestamptz, _>(row.updated_at)
                .bind::<Nullable<Timestamptz>, _>(row.deleted_at)
                .bind::<BigInt, _>(row.revision)
                .bind::<SqlUuid, _>(row.id)
                .bind::<Text, _>(expected.status.as_str())
                .bind::<Nullable<SqlUuid>, _>(expected.reviewer_id.map(UserId::into_inner))
                .bind::<Bool, _>(expected.deleted)
                .bind::<BigInt, _>(expected_revision)
                .execute(connection)
                .map_err(StoryRepositoryError::persistence)?;
            if affected == 0 {
                return Err(classify_missed_write(connection, story_id));
            }
            Ok(())
        })
        .await
    }

    async fn purge(&self, id: StoryId) -> StoryRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(
                stories::table
                    .filter(stories::id.eq(id.into_inner()))
                    .filter(stories::deleted_at.is_not_null()),
            )
            .execute(connection)
            .map_err(StoryRepositoryError::persistence)?;
            if affected == 0 {
                return Err(classify_missed_write(connection, id));
            }
            Ok(())
        })
        .await
    }

    async fn stats(&self, scope: StatsScope) -> StoryRepositoryResult<StoryStats> {
        self.run_blocking(move |connection| match scope {
            StatsScope::All => Ok(StoryStats::AllStories(status_counts(connection, None)?)),
            StatsScope::Author(author) => Ok(StoryStats::MyStories(status_counts(
                connection,
                Some(author),
            )?)),
            StatsScope::Reviewer(reviewer) => Ok(StoryStats::ReviewQueue(review_queue_counts(
                connection, reviewer,
            )?)),
        })
        .await
    }
}

fn to_new_row(story: &Story) -> StoryRepositoryResult<NewStoryRow> {
    Ok(NewStoryRow {
        id: story.id().into_inner(),
        title: story.title().to_owned(),
        content: story.content().to_owned(),
        status: story.status().as_str().to_owned(),
        author_id: story.author_id().into_inner(),
        reviewer_id: story.reviewer_id().map(UserId::into_inner),
        feedback: story.feedback().map(str::to_owned),
        created_at: story.created_at(),
        updated_at: story.updated_at(),
        deleted_at: story.deleted_at(),
        revision: to_revision(story.revision())?,
    })
}

fn row_to_story(row: StoryRow) -> StoryRepositoryResult<Story> {
    let status =
        StoryStatus::try_from(row.status.as_str()).map_err(StoryRepositoryError::persistence)?;

    Ok(Story::from_persisted(PersistedStoryData {
        id: StoryId::from_uuid(row.id),
        title: row.title,
        content: row.content,
        status,
        author_id: UserId::from_uuid(row.author_id),
        reviewer_id: row.reviewer_id.map(UserId::from_uuid),
        feedback: row.feedback,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
        revision: to_count(row.revision)?,
    }))
}

fn find_row(connection: &mut PgConnection, id: StoryId) -> StoryRepositoryResult<Option<StoryRow>> {
    stories::table
        .filter(stories::id.eq(id.into_inner()))
        .select(StoryRow::as_select())
        .first::<StoryRow>(connection)
        .optional()
        .map_err(StoryRepositoryError::persistence)
}

/// Tells a missing story apart from a guard mismatch after a write hit no
/// rows.
fn classify_missed_write(connection: &mut PgConnection, id: StoryId) -> StoryRepositoryError {
    match find_row(connection, id) {
        Ok(Some(_)) => StoryRepositoryError::Conflict(id),
        Ok(None) => StoryRepositoryError::NotFound(id),
        Err(err) => err,
    }
}

/// Builds an `ILIKE` pattern matching `term` literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn status_counts(
    connection: &mut PgConnection,
    author: Option<UserId>,
) -> StoryRepositoryResult<StatusCounts> {
    let row = diesel::sql_query(STATUS_COUNTS_SQL)
        .bind::<Nullable<SqlUuid>, _>(author.map(UserId::into_inner))
        .get_result::<StatusCountRow>(connection)
        .map_err(StoryRepositoryError::persistence)?;

    Ok(StatusCounts::from_pairs([
        (StoryStatus::WaitingForReview, to_count(row.waiting_for_review)?),
        (StoryStatus::InReview, to_count(row.in_review)?),
        (StoryStatus::Approved, to_count(row.approved)?),
        (StoryStatus::Rejected, to_count(row.rejected)?),
        (StoryStatus::Rework, to_count(row.rework)?),
        (StoryStatus::Cancelled, to_count(row.cancelled)?),
        (StoryStatus::Completed, to_count(row.completed)?),
    ]))
}

fn review_queue_counts(
    connection: &mut PgConnection,
    reviewer: UserId,
) -> StoryRepositoryResult<ReviewQueueCounts> {
    let row = diesel::sql_query(REVIEW_QUEUE_SQL)
        .bind::<SqlUuid, _>(reviewer.into_inner())
        .get_result::<ReviewQueueRow>(connection)
        .map_err(StoryRepositoryError::persistence)?;

    Ok(ReviewQueueCounts {
        waiting_unassigned: to_count(row.waiting_unassigned)?,
        waiting_assigned_to_me: to_count(row.waiting_assigned_to_me)?,
        in_review_by_me: to_count(row.in_review_by_me)?,
        total_reviewed_by_me: to_count(row.total_reviewed_by_me)?,
    })
}

fn to_count(value: i64) -> StoryRepositoryResult<u64> {
    u64::try_from(value).map_err(StoryRepositoryError::persistence)
}

fn to_revision(value: u64) -> StoryRepositoryResult<i64> {
    i64::try_from(value).map_err(StoryRepositoryError::persistence)
}
