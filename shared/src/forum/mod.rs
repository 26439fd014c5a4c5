mod error;
#[allow(clippy::module_inception)]
mod forum;
mod forum_config;
mod publisher;
mod role;
mod timed_forum;

pub use error::ForumError;
pub use forum::Forum;
pub use forum_config::ForumConfig;
pub use publisher::{ForumPublisher, Member, Publisher, Subscriber};
pub use role::{ForumRole, LocalRole, Reaction, Route};
pub use timed_forum::TimedForum;

/// Position of a pipe in the forum it is connected to
pub type PipeIndex = usize;
