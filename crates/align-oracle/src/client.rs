use align_protocol::{AiValidationRequest, AlignmentLedger, ProtocolError, Submission, SubmissionTopicLink, Topic};
use align_types::{LinkId, PublicKey, RequestId, SubmissionId, TopicId, VoteChoice};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Result of the oracle's compare-and-swap claim on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This agent holds the claim and may proceed to the judge call.
    Won,
    /// Another claimant holds it, or the request already left the open
    /// states; skip it.
    Lost,
}

/// Seam to the ledger: the agent only ever talks through this trait, so a
/// remote RPC backend and the in-process ledger are interchangeable.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn list_ai_requests(&self) -> Result<Vec<AiValidationRequest>>;
    async fn link(&self, id: LinkId) -> Result<SubmissionTopicLink>;
    async fn topic(&self, id: TopicId) -> Result<Topic>;
    async fn submission(&self, id: SubmissionId) -> Result<Submission>;

    /// Atomic `Pending → Processing` transition; only the winner proceeds.
    async fn claim_ai_validation(&self, request: RequestId) -> Result<ClaimOutcome>;

    async fn submit_ai_vote(
        &self,
        request: RequestId,
        ai_request_index: u64,
        decision: VoteChoice,
    ) -> Result<()>;
}

/// In-process client wrapping the ledger directly, signing as the
/// configured oracle key.
pub struct InProcessLedgerClient {
    ledger: Arc<AlignmentLedger>,
    oracle: PublicKey,
}

impl InProcessLedgerClient {
    pub fn new(ledger: Arc<AlignmentLedger>, oracle: PublicKey) -> Self {
        Self { ledger, oracle }
    }
}

#[async_trait]
impl LedgerClient for InProcessLedgerClient {
    async fn list_ai_requests(&self) -> Result<Vec<AiValidationRequest>> {
        Ok(self.ledger.list_ai_requests().await)
    }

    async fn link(&self, id: LinkId) -> Result<SubmissionTopicLink> {
        self.ledger
            .link(id)
            .await
            .ok_or_else(|| anyhow!("link {} not found", id))
    }

    async fn topic(&self, id: TopicId) -> Result<Topic> {
        self.ledger
            .topic(id)
            .await
            .ok_or_else(|| anyhow!("topic {} not found", id))
    }

    async fn submission(&self, id: SubmissionId) -> Result<Submission> {
        self.ledger
            .submission(id)
            .await
            .ok_or_else(|| anyhow!("submission {} not found", id))
    }

    async fn claim_ai_validation(&self, request: RequestId) -> Result<ClaimOutcome> {
        match self.ledger.claim_ai_validation(self.oracle, request).await {
            Ok(()) => Ok(ClaimOutcome::Won),
            // Losing the race or arriving after completion are normal
            // outcomes, not errors.
            Err(ProtocolError::AiRequestAlreadyClaimed)
            | Err(ProtocolError::InvalidAiRequestStatus) => Ok(ClaimOutcome::Lost),
            Err(e) => Err(e.into()),
        }
    }

    async fn submit_ai_vote(
        &self,
        request: RequestId,
        ai_request_index: u64,
        decision: VoteChoice,
    ) -> Result<()> {
        self.ledger
            .submit_ai_vote(self.oracle, request, ai_request_index, decision)
            .await?;
        Ok(())
    }
}
