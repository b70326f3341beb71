//! Story status state machine and review outcomes.

use super::ParseStoryStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    /// Submitted by the author and waiting for a reviewer.
    WaitingForReview,
    /// Claimed by a reviewer.
    InReview,
    /// Accepted by the reviewer.
    Approved,
    /// Refused by the reviewer.
    Rejected,
    /// Returned to the author for improvements.
    Rework,
    /// Withdrawn from review by the reviewer.
    Cancelled,
    /// Published by an external publication step.
    Completed,
}

impl StoryStatus {
    /// Every status in canonical display order.
    pub const ALL: [Self; 7] = [
        Self::WaitingForReview,
        Self::InReview,
        Self::Approved,
        Self::Rejected,
        Self::Rework,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaitingForReview => "waiting_for_review",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Rework => "rework",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Returns the human-readable label used in listings and tabs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WaitingForReview => "Waiting for Review",
            Self::InReview => "In Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Rework => "Rework",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }

    /// Returns the badge colour used when rendering the status.
    #[must_use]
    pub const fn badge_color(self) -> BadgeColor {
        match self {
            Self::WaitingForReview => BadgeColor::Warning,
            Self::InReview => BadgeColor::Info,
            Self::Approved => BadgeColor::Success,
            Self::Rejected => BadgeColor::Danger,
            Self::Rework => BadgeColor::Primary,
            Self::Cancelled | Self::Completed => BadgeColor::Secondary,
        }
    }

    /// Returns whether transition to `target` is part of the review workflow.
    ///
    /// Soft deletion is orthogonal to status and is not covered here.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::WaitingForReview, Self::InReview)
                | (
                    Self::InReview,
                    Self::Approved | Self::Rejected | Self::Cancelled | Self::Rework
                )
        )
    }

    /// Returns whether no further workflow transition can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns whether a reviewer has finished a review round.
    #[must_use]
    pub const fn is_reviewed(self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::Cancelled | Self::Rework | Self::Completed
        )
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StoryStatus {
    type Error = ParseStoryStatusError;

    /// Parses canonical labels and the legacy space-separated spelling.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(' ', "_");
        match normalized.as_str() {
            "waiting_for_review" => Ok(Self::WaitingForReview),
            "in_review" => Ok(Self::InReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "rework" => Ok(Self::Rework),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseStoryStatusError(value.to_owned())),
        }
    }
}

/// Result a reviewer can give when closing a review round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// Story accepted for publication.
    Approved,
    /// Story refused.
    Rejected,
    /// Review withdrawn.
    Cancelled,
    /// Story sent back to the author.
    Rework,
}

impl ReviewOutcome {
    /// Returns the status a story takes on with this outcome.
    #[must_use]
    pub const fn status(self) -> StoryStatus {
        match self {
            Self::Approved => StoryStatus::Approved,
            Self::Rejected => StoryStatus::Rejected,
            Self::Cancelled => StoryStatus::Cancelled,
            Self::Rework => StoryStatus::Rework,
        }
    }

    /// Maps a resolution status back to its outcome.
    #[must_use]
    pub const fn from_status(status: StoryStatus) -> Option<Self> {
        match status {
            StoryStatus::Approved => Some(Self::Approved),
            StoryStatus::Rejected => Some(Self::Rejected),
            StoryStatus::Cancelled => Some(Self::Cancelled),
            StoryStatus::Rework => Some(Self::Rework),
            StoryStatus::WaitingForReview | StoryStatus::InReview | StoryStatus::Completed => None,
        }
    }

    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.status().as_str()
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour hint for status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeColor {
    /// Attention needed.
    Warning,
    /// Informational.
    Info,
    /// Positive result.
    Success,
    /// Negative result.
    Danger,
    /// Primary accent.
    Primary,
    /// Neutral.
    Secondary,
}

impl BadgeColor {
    /// Returns the colour name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}
