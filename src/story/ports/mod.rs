//! Port contracts for the story workflow.
//!
//! Ports define infrastructure-agnostic interfaces used by story services.

pub mod directory;
pub mod notifier;
pub mod repository;

pub use directory::{UserDirectory, UserDirectoryError, UserDirectoryResult, UserProfile};
pub use notifier::{StoryNotifier, StoryNotifierError};
pub use repository::{StoryRepository, StoryRepositoryError, StoryRepositoryResult};
