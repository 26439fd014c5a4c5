mod error;
mod message;
mod message_core;
mod sync_error;

pub use error::MessageError;
pub use message::{Message, MessageAny};
pub use message_core::{MessageCore, TokenRemoval};
pub use sync_error::SyncError;
