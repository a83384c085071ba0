//! Token economy engine for the alignment voting protocol.
//!
//! Two token families, each with a temporary (protocol-custodied,
//! non-transferable) and a permanent (user-owned) variant:
//!
//! - **Align**: earned by contribution. Minted as topic-scoped tempAlign
//!   when data is submitted; converted to permanent Align only when the
//!   submission is accepted.
//! - **Reputation**: earned by correct validation. tempAlign stakes into
//!   topic-scoped tempRep; correct revealed votes convert locked tempRep
//!   into permanent Rep, incorrect or unrevealed votes burn it.
//!
//! The [`BalanceBook`] is a plain (non-locking) structure: it is owned by
//! the protocol ledger's single guarded state so that every token movement
//! commits or aborts together with the state transition that triggered it.

pub mod book;
pub mod error;
pub mod supply;
pub mod types;

pub use book::{BalanceBook, Holdings, TopicBalance};
pub use error::{EconomicsError, Result};
pub use supply::{KindSupply, SupplyLedger};
pub use types::{MintAddresses, TokenEvent, TokenEventReason, TokenKind};
