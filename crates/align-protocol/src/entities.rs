use align_economics::MintAddresses;
use align_types::{
    AiValidationStatus, LinkId, PublicKey, RequestId, SubmissionId, SubmissionStatus, TokenAmount,
    TopicId, VoteChoice, VoteCommitId, VoteHash,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Maximum topic name length in bytes.
pub const MAX_TOPIC_NAME_LEN: usize = 64;
/// Maximum topic description length in bytes.
pub const MAX_TOPIC_DESCRIPTION_LEN: usize = 256;
/// Maximum data reference length in bytes.
pub const MAX_DATA_REFERENCE_LEN: usize = 256;

/// Tunable protocol parameters recorded in global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// tempAlign minted to the contributor for each submission.
    pub tokens_to_mint: TokenAmount,
    /// Default commit phase duration in seconds (24 hours).
    pub default_commit_phase_duration: i64,
    /// Default reveal phase duration in seconds (24 hours).
    pub default_reveal_phase_duration: i64,
    /// Seconds after which a `Processing` AI-request claim goes stale and
    /// may be taken over by another oracle replica.
    pub ai_claim_expiry: i64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            tokens_to_mint: TokenAmount::new(100),
            default_commit_phase_duration: 24 * 60 * 60,
            default_reveal_phase_duration: 24 * 60 * 60,
            ai_claim_expiry: 300,
        }
    }
}

/// Global protocol state. Created once at initialization; mutated only by
/// authority-only admin instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolState {
    pub authority: PublicKey,
    pub oracle: PublicKey,
    pub mints: MintAddresses,
    /// Counts how many topics have been created.
    pub topic_count: u64,
    pub params: ProtocolParams,
}

/// A corpus accepting submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub description: String,
    pub authority: PublicKey,
    /// Count of submissions made against this topic.
    pub submission_count: u64,
    pub commit_phase_duration: i64,
    pub reveal_phase_duration: i64,
    /// Whether the topic is accepting new submissions.
    pub is_active: bool,
}

/// One contributor's data reference. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub contributor: PublicKey,
    pub timestamp: i64,
    /// Arbitrary data reference (IPFS hash, Arweave ID, URL, ...).
    pub data_reference: String,
    /// The contributor's per-user sequence index at creation time.
    pub user_submission_index: u64,
}

/// A submission's standing within one topic: phase window, tallies and
/// terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionTopicLink {
    pub id: LinkId,
    pub submission: SubmissionId,
    pub topic: TopicId,
    pub status: SubmissionStatus,
    pub commit_phase_start: i64,
    pub commit_phase_end: i64,
    pub reveal_phase_start: i64,
    pub reveal_phase_end: i64,
    /// Total yes voting power received (linear sum of revealed stakes).
    pub yes_voting_power: TokenAmount,
    /// Total no voting power received (linear sum of revealed stakes).
    pub no_voting_power: TokenAmount,
    pub total_committed_votes: u64,
    pub total_revealed_votes: u64,
    /// Running counter validating `expected_ai_request_index` on AI
    /// validation requests for this link.
    pub ai_request_count: u64,
}

impl SubmissionTopicLink {
    pub fn commit_window_contains(&self, now: i64) -> bool {
        now >= self.commit_phase_start && now < self.commit_phase_end
    }

    pub fn reveal_window_contains(&self, now: i64) -> bool {
        now >= self.reveal_phase_start && now < self.reveal_phase_end
    }

    pub fn reveal_window_closed(&self, now: i64) -> bool {
        now >= self.reveal_phase_end
    }

    /// Accept iff yes strictly exceeds no; a tie rejects.
    pub fn outcome(&self) -> SubmissionStatus {
        if self.yes_voting_power > self.no_voting_power {
            SubmissionStatus::Accepted
        } else {
            SubmissionStatus::Rejected
        }
    }
}

/// Per-user identity: sequence counter and the user's four token account
/// addresses (protocol-custodied temporary accounts, user-owned permanent
/// accounts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: PublicKey,
    /// Local submission counter, checked against
    /// `current_submission_index` at submission time.
    pub submission_count: u64,
    pub temp_align_account: PublicKey,
    pub temp_rep_account: PublicKey,
    pub align_account: PublicKey,
    pub rep_account: PublicKey,
}

impl UserProfile {
    pub fn new(user: PublicKey, mints: &MintAddresses) -> Self {
        Self {
            user,
            submission_count: 0,
            temp_align_account: derive_token_account(&user, &mints.temp_align),
            temp_rep_account: derive_token_account(&user, &mints.temp_rep),
            align_account: derive_token_account(&user, &mints.align),
            rep_account: derive_token_account(&user, &mints.rep),
        }
    }
}

/// Deterministic token account address: any mismatch between a derived
/// address and a provided one fails before mutation.
pub fn derive_token_account(user: &PublicKey, mint: &PublicKey) -> PublicKey {
    let mut hasher = Sha256::new();
    hasher.update(b"token_account");
    hasher.update(user.as_bytes());
    hasher.update(mint.as_bytes());
    PublicKey::from_bytes(hasher.finalize().into())
}

/// One validator's commitment for one link; unique per (validator, link).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteCommit {
    pub id: VoteCommitId,
    pub link: LinkId,
    pub validator: PublicKey,
    /// SHA-256 commitment over (validator, link, choice, nonce).
    pub vote_hash: VoteHash,
    pub revealed: bool,
    pub finalized: bool,
    /// The revealed choice; only valid after reveal.
    pub vote_choice: Option<VoteChoice>,
    pub commit_timestamp: i64,
    pub vote_amount: TokenAmount,
    /// Permanent Rep stake (true) or temporary tempRep stake (false).
    pub is_permanent_rep: bool,
}

/// One oracle-assignable judgment task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiValidationRequest {
    pub id: RequestId,
    pub link: LinkId,
    /// The original contributor of the submission.
    pub requester: PublicKey,
    /// tempRep spent by the requester; becomes the AI's voting power.
    pub temp_rep_staked: TokenAmount,
    pub request_timestamp: i64,
    pub status: AiValidationStatus,
    /// The AI's decision, populated upon completion.
    pub ai_decision: Option<VoteChoice>,
    /// Populated upon completion; equals `temp_rep_staked`.
    pub ai_voting_power: TokenAmount,
    /// Index (from the link counter) used for this request.
    pub request_index: u64,
    /// When the current `Processing` claim was taken.
    pub claimed_at: Option<i64>,
}

impl AiValidationRequest {
    /// A `Processing` claim older than `expiry` seconds is stale and may
    /// be re-claimed.
    pub fn claim_is_stale(&self, now: i64, expiry: i64) -> bool {
        match (self.status, self.claimed_at) {
            (AiValidationStatus::Processing, Some(at)) => now >= at + expiry,
            _ => false,
        }
    }
}
