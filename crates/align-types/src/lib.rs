pub mod amount;
pub mod commitment;
pub mod id;
pub mod keys;
pub mod lifecycle;
pub mod vote;

pub use amount::TokenAmount;
pub use commitment::{compute_vote_hash, VoteHash};
pub use id::{LinkId, RequestId, SubmissionId, TopicId, VoteCommitId};
pub use keys::PublicKey;
pub use lifecycle::LifecycleState;
pub use vote::{AiValidationStatus, SubmissionStatus, VoteChoice};
