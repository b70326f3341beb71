//! Listing filters and the role-scoped repository query built from them.

use super::{Actor, Capability, Role, Story, StoryStatus, UserId};

/// How soft-deleted stories are treated by a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrashedFilter {
    /// Only live stories.
    #[default]
    Without,
    /// Live and deleted stories.
    With,
    /// Only deleted stories.
    Only,
}

impl TrashedFilter {
    /// Returns whether a story with the given tombstone state passes.
    #[must_use]
    pub const fn admits(self, deleted: bool) -> bool {
        match self {
            Self::Without => !deleted,
            Self::With => true,
            Self::Only => deleted,
        }
    }
}

/// Listing filter chosen in the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFilter {
    status: Option<StoryStatus>,
    search: Option<String>,
    trashed: TrashedFilter,
}

impl StoryFilter {
    /// Creates a filter that matches every visible live story.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to one status tab.
    #[must_use]
    pub const fn with_status(mut self, status: StoryStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the listing to titles containing `search`, ignoring case.
    ///
    /// Blank search terms are ignored.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let term = search.into().trim().to_lowercase();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    /// Sets the trashed filter. Only honoured for admins.
    #[must_use]
    pub const fn with_trashed(mut self, trashed: TrashedFilter) -> Self {
        self.trashed = trashed;
        self
    }

    /// Returns the status tab, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StoryStatus> {
        self.status
    }

    /// Returns the normalized search term, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns the requested trashed filter.
    #[must_use]
    pub const fn trashed(&self) -> TrashedFilter {
        self.trashed
    }
}

/// Repository query with visibility rules already applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryQuery {
    /// Only stories by this author.
    pub author_id: Option<UserId>,
    /// Only stories with this status.
    pub status: Option<StoryStatus>,
    /// Lower-case title substring.
    pub search: Option<String>,
    /// Tombstone handling.
    pub trashed: TrashedFilter,
}

impl StoryQuery {
    /// Scopes `filter` to what `actor` may see.
    ///
    /// Writers are pinned to their own stories and only admins can reach
    /// deleted stories.
    #[must_use]
    pub fn for_actor(actor: &Actor, filter: &StoryFilter) -> Self {
        let author_id = (actor.role() == Role::Writer).then(|| actor.id());
        let trashed = if actor.role().allows(Capability::ViewDeleted) {
            filter.trashed()
        } else {
            TrashedFilter::Without
        };
        Self {
            author_id,
            status: filter.status(),
            search: filter.search().map(str::to_owned),
            trashed,
        }
    }

    /// Returns whether `story` satisfies the query.
    #[must_use]
    pub fn matches(&self, story: &Story) -> bool {
        self.trashed.admits(story.is_deleted())
            && self.author_id.is_none_or(|author| story.author_id() == author)
            && self.status.is_none_or(|status| story.status() == status)
            && self
                .search
                .as_deref()
                .is_none_or(|term| story.title().to_lowercase().contains(term))
    }
}
