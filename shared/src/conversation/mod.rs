mod conversation;
mod error;
mod exchange;
mod letter;

pub use conversation::Conversation;
pub use error::ConversationError;
pub use exchange::{Exchange, Inform, Reply, Request};
pub use letter::{Letter, Mailbox};
