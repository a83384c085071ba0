use align_types::{PublicKey, TokenAmount, TopicId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// The four token families tracked by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Temporary alignment: topic-scoped, protocol-custodied, minted on
    /// submission.
    TempAlign,
    /// Permanent alignment: user-owned, minted on accepted submissions.
    Align,
    /// Temporary reputation: topic-scoped, staked from tempAlign,
    /// consumed by voting and AI-validation requests.
    TempRep,
    /// Permanent reputation: user-owned, minted for correct votes, never
    /// destroyed by voting.
    Rep,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::TempAlign => write!(f, "tempAlign"),
            TokenKind::Align => write!(f, "align"),
            TokenKind::TempRep => write!(f, "tempRep"),
            TokenKind::Rep => write!(f, "rep"),
        }
    }
}

/// The four mint addresses recorded in global state. Derived
/// deterministically from the protocol authority and a fixed per-kind
/// prefix, so any mismatch between a derived address and a provided one is
/// detectable before mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAddresses {
    pub temp_align: PublicKey,
    pub align: PublicKey,
    pub temp_rep: PublicKey,
    pub rep: PublicKey,
}

impl MintAddresses {
    pub fn derive(authority: &PublicKey) -> Self {
        Self {
            temp_align: derive_mint(authority, b"mint:temp_align"),
            align: derive_mint(authority, b"mint:align"),
            temp_rep: derive_mint(authority, b"mint:temp_rep"),
            rep: derive_mint(authority, b"mint:rep"),
        }
    }

    pub fn of(&self, kind: TokenKind) -> PublicKey {
        match kind {
            TokenKind::TempAlign => self.temp_align,
            TokenKind::Align => self.align,
            TokenKind::TempRep => self.temp_rep,
            TokenKind::Rep => self.rep,
        }
    }
}

fn derive_mint(authority: &PublicKey, prefix: &[u8]) -> PublicKey {
    let mut hasher = Sha256::new();
    hasher.update(prefix);
    hasher.update(authority.as_bytes());
    PublicKey::from_bytes(hasher.finalize().into())
}

/// Why a token movement happened. Every mint/burn is paired with the state
/// transition that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEventReason {
    /// tempAlign minted when a submission is created.
    SubmissionMint,
    /// tempAlign burned and tempRep minted by staking.
    Stake,
    /// tempAlign converted to permanent Align on an accepted submission.
    SubmissionConversion,
    /// Locked tempRep converted to permanent Rep for a correct vote.
    VoteReward,
    /// Locked tempRep burned for an incorrect or unrevealed vote.
    VoteSlash,
    /// tempRep spent to create an AI validation request.
    AiRequestStake,
}

/// One token movement, recorded for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEvent {
    pub user: PublicKey,
    pub topic: Option<TopicId>,
    pub kind: TokenKind,
    pub minted: TokenAmount,
    pub burned: TokenAmount,
    pub reason: TokenEventReason,
    pub timestamp: DateTime<Utc>,
}
