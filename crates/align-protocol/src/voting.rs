use crate::entities::VoteCommit;
use crate::error::{ProtocolError, Result};
use crate::ledger::{unix_now, AlignmentLedger};
use crate::metrics;
use align_types::{
    compute_vote_hash, LinkId, PublicKey, SubmissionStatus, TokenAmount, VoteChoice, VoteCommitId,
    VoteHash,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What happened to a validator's stake at vote finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteFinalization {
    /// Revealed and matched the outcome: locked tempRep burned, equal
    /// permanent Rep minted.
    Rewarded(TokenAmount),
    /// Revealed wrong or never revealed: locked tempRep burned, nothing
    /// minted.
    Slashed(TokenAmount),
    /// Permanent Rep stake: never touched by finalization.
    PermanentStakeReleased,
}

impl AlignmentLedger {
    /// Commit a hashed vote on a submission within a topic. Valid only
    /// while the commit window is open; the actual choice stays hidden
    /// behind the hash until reveal.
    pub async fn commit_vote(
        &self,
        validator: PublicKey,
        link: LinkId,
        vote_hash: VoteHash,
        vote_amount: TokenAmount,
        is_permanent_rep: bool,
    ) -> Result<VoteCommitId> {
        let mut st = self.inner.write().await;

        let link_entry = st
            .links
            .get(&link)
            .ok_or_else(|| ProtocolError::LinkNotFound(link.to_string()))?;
        if link_entry.status != SubmissionStatus::Pending {
            return Err(ProtocolError::SubmissionNotPending);
        }

        let now = unix_now();
        if now < link_entry.commit_phase_start {
            return Err(ProtocolError::CommitPhaseNotStarted);
        }
        if now >= link_entry.commit_phase_end {
            return Err(ProtocolError::CommitPhaseEnded);
        }

        let submission = st
            .submissions
            .get(&link_entry.submission)
            .ok_or_else(|| ProtocolError::SubmissionNotFound(link_entry.submission.to_string()))?;
        if submission.contributor == validator {
            return Err(ProtocolError::SelfVotingNotAllowed);
        }

        if st.vote_index.contains_key(&(validator, link)) {
            return Err(ProtocolError::DuplicateVoteCommitment);
        }
        if vote_amount.is_zero() {
            return Err(ProtocolError::ZeroVoteAmount);
        }

        let topic = link_entry.topic;
        crate::ledger::require_profile(&st.profiles, &validator)?;

        if is_permanent_rep {
            let holdings = st.book.holdings(&validator);
            if holdings.rep < vote_amount {
                return Err(ProtocolError::InsufficientVotingPower);
            }
        } else {
            // Validates free tempRep and moves it to the locked pool; the
            // last fallible step, so an error leaves nothing changed.
            st.book.lock_temp_rep(validator, topic, vote_amount)?;
        }

        let id = VoteCommitId::new(st.next_vote);
        st.next_vote += 1;
        let commit = VoteCommit {
            id,
            link,
            validator,
            vote_hash,
            revealed: false,
            finalized: false,
            vote_choice: None,
            commit_timestamp: now,
            vote_amount,
            is_permanent_rep,
        };
        st.votes.insert(id, commit);
        st.vote_index.insert((validator, link), id);
        if let Some(link_entry) = st.links.get_mut(&link) {
            link_entry.total_committed_votes += 1;
        }

        metrics::VOTES_COMMITTED.inc();
        info!(
            link = %link,
            validator = %validator,
            amount = %vote_amount,
            permanent = is_permanent_rep,
            "🗳️ Vote committed"
        );
        Ok(id)
    }

    /// Reveal a previously committed vote. The commitment hash is
    /// recomputed from the disclosed (choice, nonce); any mismatch fails
    /// closed with no state change.
    pub async fn reveal_vote(
        &self,
        validator: PublicKey,
        link: LinkId,
        choice: VoteChoice,
        nonce: u64,
    ) -> Result<()> {
        let mut st = self.inner.write().await;

        let link_entry = st
            .links
            .get(&link)
            .ok_or_else(|| ProtocolError::LinkNotFound(link.to_string()))?;
        if link_entry.status != SubmissionStatus::Pending {
            return Err(ProtocolError::SubmissionNotPending);
        }

        let now = unix_now();
        if now < link_entry.reveal_phase_start {
            return Err(ProtocolError::RevealPhaseNotStarted);
        }
        if now >= link_entry.reveal_phase_end {
            return Err(ProtocolError::RevealPhaseEnded);
        }

        let vote_id = *st
            .vote_index
            .get(&(validator, link))
            .ok_or_else(|| ProtocolError::VoteCommitNotFound(validator.to_string()))?;
        let vote = st.votes.get(&vote_id).expect("vote index points at vote");
        if vote.revealed {
            return Err(ProtocolError::VoteAlreadyRevealed);
        }

        let expected = compute_vote_hash(&validator, link, choice, nonce);
        if expected != vote.vote_hash {
            return Err(ProtocolError::InvalidVoteHash);
        }

        let amount = vote.vote_amount;
        let (new_yes, new_no) = {
            let link_entry = st.links.get(&link).expect("link checked above");
            match choice {
                VoteChoice::Yes => (
                    link_entry
                        .yes_voting_power
                        .checked_add(amount)
                        .ok_or(ProtocolError::Overflow)?,
                    link_entry.no_voting_power,
                ),
                VoteChoice::No => (
                    link_entry.yes_voting_power,
                    link_entry
                        .no_voting_power
                        .checked_add(amount)
                        .ok_or(ProtocolError::Overflow)?,
                ),
            }
        };

        // All checks passed; apply vote and tally together.
        let vote = st.votes.get_mut(&vote_id).expect("vote exists");
        vote.revealed = true;
        vote.vote_choice = Some(choice);
        let link_entry = st.links.get_mut(&link).expect("link exists");
        link_entry.yes_voting_power = new_yes;
        link_entry.no_voting_power = new_no;
        link_entry.total_revealed_votes += 1;

        metrics::VOTES_REVEALED
            .with_label_values(&[&choice.to_string()])
            .inc();
        info!(
            link = %link,
            validator = %validator,
            choice = %choice,
            amount = %amount,
            "👁️ Vote revealed"
        );
        Ok(())
    }

    /// Finalize a link after its reveal window closes. Accept iff yes
    /// voting power strictly exceeds no; a tie rejects. On accept the
    /// contributor's tempAlign converts to permanent Align up to the
    /// minted amount. One-shot per link.
    pub async fn finalize_submission(&self, link: LinkId) -> Result<SubmissionStatus> {
        let mut st = self.inner.write().await;

        let link_entry = st
            .links
            .get(&link)
            .ok_or_else(|| ProtocolError::LinkNotFound(link.to_string()))?;
        if link_entry.status != SubmissionStatus::Pending {
            return Err(ProtocolError::SubmissionAlreadyFinalized);
        }
        if !link_entry.reveal_window_closed(unix_now()) {
            return Err(ProtocolError::RevealPhaseNotEnded);
        }

        let outcome = link_entry.outcome();
        let topic = link_entry.topic;
        let contributor = st
            .submissions
            .get(&link_entry.submission)
            .ok_or_else(|| ProtocolError::SubmissionNotFound(link_entry.submission.to_string()))?
            .contributor;

        let converted = if outcome == SubmissionStatus::Accepted {
            let cap = st.state.params.tokens_to_mint;
            st.book.convert_temp_align(contributor, topic, cap)?
        } else {
            TokenAmount::ZERO
        };

        let link_entry = st.links.get_mut(&link).expect("link exists");
        link_entry.status = outcome;

        metrics::SUBMISSIONS_FINALIZED
            .with_label_values(&[match outcome {
                SubmissionStatus::Accepted => "accepted",
                SubmissionStatus::Rejected => "rejected",
                SubmissionStatus::Pending => unreachable!(),
            }])
            .inc();
        info!(
            link = %link,
            outcome = ?outcome,
            converted = %converted,
            "🏁 Submission finalized"
        );
        Ok(outcome)
    }

    /// Settle one validator's stake after the submission is finalized.
    /// Correct revealed temporary stakes convert to permanent Rep; wrong
    /// or unrevealed temporary stakes burn; permanent stakes are never
    /// touched. Once per VoteCommit.
    pub async fn finalize_vote(
        &self,
        link: LinkId,
        validator: PublicKey,
    ) -> Result<VoteFinalization> {
        let mut st = self.inner.write().await;

        let link_entry = st
            .links
            .get(&link)
            .ok_or_else(|| ProtocolError::LinkNotFound(link.to_string()))?;
        let outcome = link_entry.status;
        if outcome == SubmissionStatus::Pending {
            return Err(ProtocolError::SubmissionNotFinalized);
        }
        let topic = link_entry.topic;

        let vote_id = *st
            .vote_index
            .get(&(validator, link))
            .ok_or_else(|| ProtocolError::VoteCommitNotFound(validator.to_string()))?;
        let vote = st.votes.get(&vote_id).expect("vote index points at vote");
        if vote.finalized {
            return Err(ProtocolError::VoteAlreadyFinalized);
        }

        let amount = vote.vote_amount;
        let result = if vote.is_permanent_rep {
            VoteFinalization::PermanentStakeReleased
        } else {
            let correct = match vote.vote_choice {
                Some(VoteChoice::Yes) => outcome == SubmissionStatus::Accepted,
                Some(VoteChoice::No) => outcome == SubmissionStatus::Rejected,
                None => false,
            };
            if correct {
                st.book.reward_locked_temp_rep(validator, topic, amount)?;
                VoteFinalization::Rewarded(amount)
            } else {
                st.book.slash_locked_temp_rep(validator, topic, amount)?;
                VoteFinalization::Slashed(amount)
            }
        };

        let vote = st.votes.get_mut(&vote_id).expect("vote exists");
        vote.finalized = true;

        metrics::VOTES_FINALIZED
            .with_label_values(&[match result {
                VoteFinalization::Rewarded(_) => "rewarded",
                VoteFinalization::Slashed(_) => "slashed",
                VoteFinalization::PermanentStakeReleased => "permanent",
            }])
            .inc();
        info!(
            link = %link,
            validator = %validator,
            result = ?result,
            "🧾 Vote finalized"
        );
        Ok(result)
    }
}
