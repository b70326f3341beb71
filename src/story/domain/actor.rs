//! Actors, roles and the capability policy.
//!
//! Every workflow operation names the [`Capability`] it needs; the actor's
//! [`Role`] decides whether it is granted. Visibility is a separate check
//! applied before any operation touches a story.

use super::{ParseRoleError, Story, StoryDomainError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role held by an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Authors stories.
    Writer,
    /// Claims and resolves reviews.
    Reviewer,
    /// Administers every story, including deleted ones.
    Admin,
}

impl Role {
    /// Returns the canonical role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Writer => "writer",
            Self::Reviewer => "reviewer",
            Self::Admin => "admin",
        }
    }

    /// Returns whether this role grants `capability`.
    #[must_use]
    pub const fn allows(self, capability: Capability) -> bool {
        match self {
            Self::Writer => matches!(capability, Capability::CreateStory | Capability::EditStory),
            Self::Reviewer => matches!(
                capability,
                Capability::ClaimReview | Capability::ResolveReview
            ),
            Self::Admin => !matches!(
                capability,
                Capability::ClaimReview | Capability::ResolveReview
            ),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "writer" => Ok(Self::Writer),
            "reviewer" => Ok(Self::Reviewer),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Operation-level permission checked against a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Submit a new story.
    CreateStory,
    /// Change a story's title and content.
    EditStory,
    /// Start reviewing a waiting story.
    ClaimReview,
    /// Close a review with an outcome.
    ResolveReview,
    /// Put a waiting story into a reviewer's queue.
    AssignReviewer,
    /// Tombstone a story.
    DeleteStory,
    /// Clear a story's tombstone.
    RestoreStory,
    /// Permanently remove a tombstoned story.
    PurgeStory,
    /// List and view tombstoned stories.
    ViewDeleted,
}

impl Capability {
    /// Returns the canonical capability name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateStory => "create stories",
            Self::EditStory => "edit stories",
            Self::ClaimReview => "claim reviews",
            Self::ResolveReview => "resolve reviews",
            Self::AssignReviewer => "assign reviewers",
            Self::DeleteStory => "delete stories",
            Self::RestoreStory => "restore stories",
            Self::PurgeStory => "purge stories",
            Self::ViewDeleted => "view deleted stories",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    /// Creates an actor from identity provider data.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Creates a writer with a fresh identifier.
    #[must_use]
    pub fn writer() -> Self {
        Self::new(UserId::new(), Role::Writer)
    }

    /// Creates a reviewer with a fresh identifier.
    #[must_use]
    pub fn reviewer() -> Self {
        Self::new(UserId::new(), Role::Reviewer)
    }

    /// Creates an admin with a fresh identifier.
    #[must_use]
    pub fn admin() -> Self {
        Self::new(UserId::new(), Role::Admin)
    }

    /// Returns the actor's user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Checks that the actor's role grants `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryDomainError::Unauthorized`] when the role lacks the
    /// capability.
    pub const fn authorize(&self, capability: Capability) -> Result<(), StoryDomainError> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(StoryDomainError::Unauthorized {
                role: self.role,
                capability,
            })
        }
    }

    /// Returns whether the story is visible to this actor.
    ///
    /// Writers only see their own stories, and only admins see deleted ones.
    #[must_use]
    pub fn can_view(&self, story: &Story) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Reviewer => !story.is_deleted(),
            Role::Writer => !story.is_deleted() && story.author_id() == self.id,
        }
    }
}
