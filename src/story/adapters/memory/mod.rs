//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! unit testing without database or identity provider dependencies.

mod directory;
mod notifier;
mod story;

pub use directory::InMemoryUserDirectory;
pub use notifier::RecordingNotifier;
pub use story::InMemoryStoryRepository;
