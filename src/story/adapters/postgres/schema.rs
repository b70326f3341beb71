//! Diesel schema for story persistence.

diesel::table! {
    /// Story records under review workflow control.
    stories (id) {
        /// Story identifier.
        id -> Uuid,
        /// Story title.
        #[max_length = 100]
        title -> Varchar,
        /// Story body.
        content -> Text,
        /// Workflow status label.
        #[max_length = 50]
        status -> Varchar,
        /// Author identifier.
        author_id -> Uuid,
        /// Reviewer identifier, set once a review is claimed or assigned.
        reviewer_id -> Nullable<Uuid>,
        /// Reviewer feedback.
        feedback -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Soft-deletion tombstone.
        deleted_at -> Nullable<Timestamptz>,
        /// Revision counter used by conditional writes.
        revision -> Int8,
    }
}
