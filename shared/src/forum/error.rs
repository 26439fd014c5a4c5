use thiserror::Error;

/// Errors that can occur while driving a forum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForumError {
    /// The operation is only allowed before the forum is locked
    #[error("Forum is locked, {operation}() is only allowed before Forum.lock() is called")]
    Locked {
        operation: &'static str,
    },

    /// The operation is only allowed once the forum is locked
    #[error("Forum is unlocked, {operation}() is only allowed after Forum.lock() is called")]
    Unlocked {
        operation: &'static str,
    },
}
