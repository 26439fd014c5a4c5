use serde::{Deserialize, Serialize};

/// Verdict of the referee on a message it relayed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncError {
    /// The message checked out
    #[default]
    None,
    /// The message failed its check but was applied anyway. Every
    /// participant runs its soft sync error hook to resynchronize.
    Soft,
    /// The message failed its check and was not applied. Only its sender
    /// hears back, and has to undo it.
    Hard,
}
