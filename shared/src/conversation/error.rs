use thiserror::Error;

use crate::Flavor;

/// Errors that can occur while exchanging letters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// A letter could not be written or read
    #[error("Failed to encode or decode letter of flavor {flavor}: {reason}")]
    Codec {
        flavor: Flavor,
        reason: String,
    },
}
