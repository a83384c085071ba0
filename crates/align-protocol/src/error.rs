use thiserror::Error;

/// Protocol operation result type
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Ledger-side errors. Each is a deterministic pre-mutation validation
/// failure: the instruction aborts with no partial state change. All are
/// permanent for the given input except the phase-timing variants, which
/// become valid once the window opens.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid authority for this state")]
    InvalidAuthority,

    #[error("the signer is not the authorized AI oracle")]
    UnauthorizedOracle,

    #[error("user profile not found: {0}")]
    UserProfileNotFound(String),

    #[error("user profile already initialized: {0}")]
    UserProfileAlreadyInitialized(String),

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("topic is inactive: {0}")]
    TopicInactive(String),

    #[error("topic name cannot be empty")]
    EmptyTopicName,

    #[error("topic name exceeds maximum length of {0} bytes")]
    TopicNameTooLong(usize),

    #[error("topic description exceeds maximum length of {0} bytes")]
    TopicDescriptionTooLong(usize),

    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("submission index mismatch: expected {expected}, got {provided}")]
    IncorrectSubmissionIndex { expected: u64, provided: u64 },

    #[error("data reference cannot be empty")]
    EmptyDataReference,

    #[error("data reference exceeds maximum length of {0} bytes")]
    DataReferenceTooLong(usize),

    #[error("submission-topic link not found: {0}")]
    LinkNotFound(String),

    #[error("submission already linked to this topic")]
    SubmissionAlreadyInTopic,

    #[error("submission is not in the pending state")]
    SubmissionNotPending,

    #[error("this submission has already been finalized")]
    SubmissionAlreadyFinalized,

    #[error("submission has not been finalized yet")]
    SubmissionNotFinalized,

    #[error("commit phase has not started yet")]
    CommitPhaseNotStarted,

    #[error("commit phase has ended")]
    CommitPhaseEnded,

    #[error("reveal phase has not started yet")]
    RevealPhaseNotStarted,

    #[error("reveal phase has ended")]
    RevealPhaseEnded,

    #[error("reveal phase has not ended yet")]
    RevealPhaseNotEnded,

    #[error("invalid voting phase order")]
    InvalidPhaseOrder,

    #[error("vote has already been committed for this submission-topic pair")]
    DuplicateVoteCommitment,

    #[error("self-voting is not allowed: validators cannot vote on their own submissions")]
    SelfVotingNotAllowed,

    #[error("vote amount must be greater than zero")]
    ZeroVoteAmount,

    #[error("cannot stake zero tokens")]
    ZeroStakeAmount,

    #[error("vote commit not found for validator {0}")]
    VoteCommitNotFound(String),

    #[error("vote has already been revealed")]
    VoteAlreadyRevealed,

    #[error("invalid vote hash")]
    InvalidVoteHash,

    #[error("vote has already been finalized")]
    VoteAlreadyFinalized,

    #[error("vote amount exceeds available reputation")]
    InsufficientVotingPower,

    #[error("the signer is not the original contributor of the submission")]
    NotSubmissionContributor,

    #[error("AI validation request not found: {0}")]
    AiRequestNotFound(String),

    #[error("AI request index mismatch: expected {expected}, got {provided}")]
    AiRequestIndexMismatch { expected: u64, provided: u64 },

    #[error("AI validation request is already claimed by a live oracle")]
    AiRequestAlreadyClaimed,

    #[error("AI validation request is not in the expected state")]
    InvalidAiRequestStatus,

    #[error("arithmetic overflow occurred")]
    Overflow,

    #[error("economics error: {0}")]
    Economics(#[from] align_economics::EconomicsError),
}
