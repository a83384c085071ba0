use crate::entities::AiValidationRequest;
use crate::error::{ProtocolError, Result};
use crate::ledger::{unix_now, AlignmentLedger};
use crate::metrics;
use align_types::{
    AiValidationStatus, LinkId, PublicKey, RequestId, SubmissionStatus, TokenAmount, VoteChoice,
};
use tracing::info;

impl AlignmentLedger {
    /// Create an AI validation request, spending tempRep immediately. Only
    /// the submission's original contributor may request, and the
    /// caller-predicted index must match the link's running counter (the
    /// guard against concurrent requests racing on the same link).
    pub async fn request_ai_validation(
        &self,
        requester: PublicKey,
        link: LinkId,
        temp_rep_to_stake: TokenAmount,
        expected_ai_request_index: u64,
    ) -> Result<RequestId> {
        let mut st = self.inner.write().await;

        let link_entry = st
            .links
            .get(&link)
            .ok_or_else(|| ProtocolError::LinkNotFound(link.to_string()))?;
        if link_entry.status != SubmissionStatus::Pending {
            return Err(ProtocolError::SubmissionNotPending);
        }

        let submission = st
            .submissions
            .get(&link_entry.submission)
            .ok_or_else(|| ProtocolError::SubmissionNotFound(link_entry.submission.to_string()))?;
        if submission.contributor != requester {
            return Err(ProtocolError::NotSubmissionContributor);
        }

        if temp_rep_to_stake.is_zero() {
            return Err(ProtocolError::ZeroStakeAmount);
        }
        if link_entry.ai_request_count != expected_ai_request_index {
            return Err(ProtocolError::AiRequestIndexMismatch {
                expected: link_entry.ai_request_count,
                provided: expected_ai_request_index,
            });
        }

        let topic = link_entry.topic;
        // Deducts the stake immediately; the request custodies it.
        st.book.spend_temp_rep(requester, topic, temp_rep_to_stake)?;

        let id = RequestId::new(st.next_request);
        st.next_request += 1;
        let request = AiValidationRequest {
            id,
            link,
            requester,
            temp_rep_staked: temp_rep_to_stake,
            request_timestamp: unix_now(),
            status: AiValidationStatus::Pending,
            ai_decision: None,
            ai_voting_power: TokenAmount::ZERO,
            request_index: expected_ai_request_index,
            claimed_at: None,
        };
        st.requests.insert(id, request);
        if let Some(link_entry) = st.links.get_mut(&link) {
            link_entry.ai_request_count += 1;
        }

        metrics::AI_REQUESTS_CREATED.inc();
        info!(
            request = %id,
            link = %link,
            requester = %requester,
            staked = %temp_rep_to_stake,
            "🤖 AI validation requested"
        );
        Ok(id)
    }

    /// Oracle-exclusive compare-and-swap `Pending → Processing`. Exactly
    /// one caller wins; a second claim fails until the first one's claim
    /// goes stale (agent crashed mid-flight), at which point the request
    /// may be taken over.
    pub async fn claim_ai_validation(&self, oracle: PublicKey, request: RequestId) -> Result<()> {
        let mut st = self.inner.write().await;
        if oracle != st.state.oracle {
            return Err(ProtocolError::UnauthorizedOracle);
        }
        let expiry = st.state.params.ai_claim_expiry;
        let entry = st
            .requests
            .get_mut(&request)
            .ok_or_else(|| ProtocolError::AiRequestNotFound(request.to_string()))?;

        let now = unix_now();
        match entry.status {
            AiValidationStatus::Pending => {}
            AiValidationStatus::Processing => {
                if !entry.claim_is_stale(now, expiry) {
                    metrics::AI_CLAIMS.with_label_values(&["lost"]).inc();
                    return Err(ProtocolError::AiRequestAlreadyClaimed);
                }
                info!(request = %request, "⏰ Stale AI claim taken over");
            }
            AiValidationStatus::Completed | AiValidationStatus::Failed => {
                return Err(ProtocolError::InvalidAiRequestStatus);
            }
        }

        entry.status = AiValidationStatus::Processing;
        entry.claimed_at = Some(now);
        metrics::AI_CLAIMS.with_label_values(&["won"]).inc();
        info!(request = %request, "🔏 AI validation request claimed");
        Ok(())
    }

    /// Oracle-exclusive fulfillment. Requires a live claim, verifies the
    /// caller-provided index against the request, adds the AI's voting
    /// power (the staked tempRep, linear) to the link's tally exactly as a
    /// revealed vote would, and completes the request.
    pub async fn submit_ai_vote(
        &self,
        oracle: PublicKey,
        request: RequestId,
        ai_request_index: u64,
        ai_decision: VoteChoice,
    ) -> Result<()> {
        let mut st = self.inner.write().await;
        if oracle != st.state.oracle {
            return Err(ProtocolError::UnauthorizedOracle);
        }

        let entry = st
            .requests
            .get(&request)
            .ok_or_else(|| ProtocolError::AiRequestNotFound(request.to_string()))?;
        if entry.status != AiValidationStatus::Processing {
            return Err(ProtocolError::InvalidAiRequestStatus);
        }
        if entry.request_index != ai_request_index {
            return Err(ProtocolError::AiRequestIndexMismatch {
                expected: entry.request_index,
                provided: ai_request_index,
            });
        }

        let link = entry.link;
        let power = entry.temp_rep_staked;
        let link_entry = st
            .links
            .get(&link)
            .ok_or_else(|| ProtocolError::LinkNotFound(link.to_string()))?;
        if link_entry.status != SubmissionStatus::Pending {
            return Err(ProtocolError::SubmissionNotPending);
        }

        let (new_yes, new_no) = match ai_decision {
            VoteChoice::Yes => (
                link_entry
                    .yes_voting_power
                    .checked_add(power)
                    .ok_or(ProtocolError::Overflow)?,
                link_entry.no_voting_power,
            ),
            VoteChoice::No => (
                link_entry.yes_voting_power,
                link_entry
                    .no_voting_power
                    .checked_add(power)
                    .ok_or(ProtocolError::Overflow)?,
            ),
        };

        let link_entry = st.links.get_mut(&link).expect("link exists");
        link_entry.yes_voting_power = new_yes;
        link_entry.no_voting_power = new_no;

        let entry = st.requests.get_mut(&request).expect("request exists");
        entry.status = AiValidationStatus::Completed;
        entry.ai_decision = Some(ai_decision);
        entry.ai_voting_power = power;

        metrics::AI_VOTES_SUBMITTED
            .with_label_values(&[&ai_decision.to_string()])
            .inc();
        info!(
            request = %request,
            link = %link,
            decision = %ai_decision,
            power = %power,
            "🤖 AI vote recorded"
        );
        Ok(())
    }
}
