/*!
# Alignment Protocol Core

The ledger-side state machine of the alignment voting protocol:

- **Commit-reveal voting**: validators lock a SHA-256 commitment during
  the commit window, disclose (choice, nonce) during the reveal window,
  and tallies accumulate as linear stake-weighted voting power.
- **Submission finalization**: after the reveal window closes a link
  resolves to `Accepted` (yes strictly greater than no) or `Rejected`
  (ties reject); acceptance converts the contributor's tempAlign into
  permanent Align.
- **Per-vote finalization**: correct revealed temporary stakes convert to
  permanent Rep, wrong or unrevealed ones burn, permanent stakes are
  never destroyed by voting.
- **AI validation lifecycle**: contributors spend tempRep to open a
  request; the configured oracle claims it with an atomic
  `Pending → Processing` transition and fulfills it exactly once.

The [`AlignmentLedger`] owns every entity in an explicit store keyed by
stable identifiers, and executes one instruction at a time behind a single
write lock: each instruction validates fully before mutating, so an error
never leaves partial state, and token movements commit together with the
transitions that trigger them.

## Module Structure

- **entities**: account structures (state, topics, submissions, links,
  profiles, vote commits, AI requests)
- **ledger**: the store plus setup, admin and submission instructions
- **voting**: commit, reveal and both finalization instructions
- **ai**: AI validation request, claim and fulfillment instructions
- **error**: protocol error surface
*/

pub mod ai;
pub mod entities;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod voting;

pub use entities::{
    AiValidationRequest, ProtocolParams, ProtocolState, Submission, SubmissionTopicLink, Topic,
    UserProfile, VoteCommit, MAX_DATA_REFERENCE_LEN, MAX_TOPIC_DESCRIPTION_LEN,
    MAX_TOPIC_NAME_LEN,
};
pub use error::{ProtocolError, Result};
pub use ledger::AlignmentLedger;
pub use voting::VoteFinalization;
