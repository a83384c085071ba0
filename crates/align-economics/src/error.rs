use crate::types::TokenKind;
use align_types::TokenAmount;
use thiserror::Error;

/// Economics operation result type
pub type Result<T> = std::result::Result<T, EconomicsError>;

/// Token accounting errors. Every variant is a pre-mutation validation
/// failure: the book is unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EconomicsError {
    #[error("insufficient {kind} balance: has {available}, needs {needed}")]
    InsufficientBalance {
        kind: TokenKind,
        available: TokenAmount,
        needed: TokenAmount,
    },

    #[error("insufficient locked {kind} balance: has {available}, needs {needed}")]
    InsufficientLockedBalance {
        kind: TokenKind,
        available: TokenAmount,
        needed: TokenAmount,
    },

    #[error("topic balance not initialized for user {user} in {topic}")]
    BalanceNotInitialized { user: String, topic: String },

    #[error("topic balance already initialized for user {user} in {topic}")]
    BalanceAlreadyInitialized { user: String, topic: String },

    #[error("arithmetic overflow")]
    Overflow,
}
