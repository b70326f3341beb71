//! Diesel row models for story persistence.

use super::schema::stories;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;

/// Query result row for story records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoryRow {
    /// Story identifier.
    pub id: uuid::Uuid,
    /// Story title.
    pub title: String,
    /// Story body.
    pub content: String,
    /// Workflow status label.
    pub status: String,
    /// Author identifier.
    pub author_id: uuid::Uuid,
    /// Reviewer identifier.
    pub reviewer_id: Option<uuid::Uuid>,
    /// Reviewer feedback.
    pub feedback: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion tombstone.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Revision counter.
    pub revision: i64,
}

/// Insert model for story records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stories)]
pub struct NewStoryRow {
    /// Story identifier.
    pub id: uuid::Uuid,
    /// Story title.
    pub title: String,
    /// Story body.
    pub content: String,
    /// Workflow status label.
    pub status: String,
    /// Author identifier.
    pub author_id: uuid::Uuid,
    /// Reviewer identifier.
    pub reviewer_id: Option<uuid::Uuid>,
    /// Reviewer feedback.
    pub feedback: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion tombstone.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Revision counter.
    pub revision: i64,
}

/// Per-status counts produced by the overview aggregate query.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct StatusCountRow {
    #[diesel(sql_type = BigInt)]
    pub waiting_for_review: i64,
    #[diesel(sql_type = BigInt)]
    pub in_review: i64,
    #[diesel(sql_type = BigInt)]
    pub approved: i64,
    #[diesel(sql_type = BigInt)]
    pub rejected: i64,
    #[diesel(sql_type = BigInt)]
    pub rework: i64,
    #[diesel(sql_type = BigInt)]
    pub cancelled: i64,
    #[diesel(sql_type = BigInt)]
    pub completed: i64,
}

/// Review queue counts produced by the reviewer aggregate query.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct ReviewQueueRow {
    #[diesel(sql_type = BigInt)]
    pub waiting_unassigned: i64,
    #[diesel(sql_type = BigInt)]
    pub waiting_assigned_to_me: i64,
    #[diesel(sql_type = BigInt)]
    pub in_review_by_me: i64,
    #[diesel(sql_type = BigInt)]
    pub total_reviewed_by_me: i64,
}
