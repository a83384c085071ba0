use crate::entities::{
    AiValidationRequest, ProtocolParams, ProtocolState, Submission, SubmissionTopicLink, Topic,
    UserProfile, VoteCommit, MAX_DATA_REFERENCE_LEN, MAX_TOPIC_DESCRIPTION_LEN,
    MAX_TOPIC_NAME_LEN,
};
use crate::error::{ProtocolError, Result};
use crate::metrics;
use align_economics::{BalanceBook, Holdings, MintAddresses, SupplyLedger, TopicBalance};
use align_types::{
    LinkId, PublicKey, RequestId, SubmissionId, SubmissionStatus, TokenAmount, TopicId,
    VoteCommitId,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::info;

/// Everything behind the ledger's single write lock. One instruction
/// executes at a time, mirroring the execution engine's atomic
/// per-instruction semantics: a method either commits all of its effects
/// or none of them.
pub(crate) struct LedgerState {
    pub(crate) state: ProtocolState,
    pub(crate) topics: BTreeMap<TopicId, Topic>,
    pub(crate) submissions: BTreeMap<SubmissionId, Submission>,
    pub(crate) links: BTreeMap<LinkId, SubmissionTopicLink>,
    /// (submission, topic) -> link, enforcing one link per pair.
    pub(crate) link_index: HashMap<(SubmissionId, TopicId), LinkId>,
    pub(crate) profiles: HashMap<PublicKey, UserProfile>,
    pub(crate) votes: BTreeMap<VoteCommitId, VoteCommit>,
    /// (validator, link) -> vote, enforcing one commitment per pair.
    pub(crate) vote_index: HashMap<(PublicKey, LinkId), VoteCommitId>,
    pub(crate) requests: BTreeMap<RequestId, AiValidationRequest>,
    pub(crate) book: BalanceBook,
    pub(crate) next_submission: u64,
    pub(crate) next_link: u64,
    pub(crate) next_vote: u64,
    pub(crate) next_request: u64,
}

/// The protocol ledger: an explicit in-memory account store keyed by
/// stable identifiers, exposing the instruction surface of the voting and
/// tokenomics state machine.
pub struct AlignmentLedger {
    pub(crate) inner: RwLock<LedgerState>,
}

pub(crate) fn unix_now() -> i64 {
    Utc::now().timestamp()
}

impl AlignmentLedger {
    /// One-time initialization: global state plus the four derived mints.
    pub fn new(authority: PublicKey, oracle: PublicKey, params: ProtocolParams) -> Self {
        let mints = MintAddresses::derive(&authority);
        info!(
            authority = %authority,
            oracle = %oracle,
            tokens_to_mint = %params.tokens_to_mint,
            "✨ Protocol state initialized"
        );
        Self {
            inner: RwLock::new(LedgerState {
                state: ProtocolState {
                    authority,
                    oracle,
                    mints,
                    topic_count: 0,
                    params,
                },
                topics: BTreeMap::new(),
                submissions: BTreeMap::new(),
                links: BTreeMap::new(),
                link_index: HashMap::new(),
                profiles: HashMap::new(),
                votes: BTreeMap::new(),
                vote_index: HashMap::new(),
                requests: BTreeMap::new(),
                book: BalanceBook::new(),
                next_submission: 0,
                next_link: 0,
                next_vote: 0,
                next_request: 0,
            }),
        }
    }

    // ---- setup ----

    /// Create a user profile and its four token accounts.
    pub async fn register_user(&self, user: PublicKey) -> Result<UserProfile> {
        let mut st = self.inner.write().await;
        if st.profiles.contains_key(&user) {
            return Err(ProtocolError::UserProfileAlreadyInitialized(
                user.to_string(),
            ));
        }
        let profile = UserProfile::new(user, &st.state.mints);
        st.profiles.insert(user, profile.clone());
        info!(user = %user, "👤 User profile created");
        Ok(profile)
    }

    /// Create the per-(user, topic) token balance. Required before the
    /// first stake, vote or AI request in a topic.
    pub async fn initialize_user_topic_balance(
        &self,
        user: PublicKey,
        topic: TopicId,
    ) -> Result<()> {
        let mut st = self.inner.write().await;
        require_profile(&st.profiles, &user)?;
        require_topic(&st.topics, topic)?;
        st.book.initialize_topic_balance(user, topic)?;
        Ok(())
    }

    // ---- admin ----

    pub async fn create_topic(
        &self,
        caller: PublicKey,
        name: String,
        description: String,
        commit_phase_duration: Option<i64>,
        reveal_phase_duration: Option<i64>,
    ) -> Result<TopicId> {
        let mut st = self.inner.write().await;
        if caller != st.state.authority {
            return Err(ProtocolError::InvalidAuthority);
        }
        if name.is_empty() {
            return Err(ProtocolError::EmptyTopicName);
        }
        if name.len() > MAX_TOPIC_NAME_LEN {
            return Err(ProtocolError::TopicNameTooLong(MAX_TOPIC_NAME_LEN));
        }
        if description.len() > MAX_TOPIC_DESCRIPTION_LEN {
            return Err(ProtocolError::TopicDescriptionTooLong(
                MAX_TOPIC_DESCRIPTION_LEN,
            ));
        }

        let id = TopicId::new(st.state.topic_count);
        let topic = Topic {
            id,
            name: name.clone(),
            description,
            authority: caller,
            submission_count: 0,
            commit_phase_duration: commit_phase_duration
                .unwrap_or(st.state.params.default_commit_phase_duration),
            reveal_phase_duration: reveal_phase_duration
                .unwrap_or(st.state.params.default_reveal_phase_duration),
            is_active: true,
        };
        st.topics.insert(id, topic);
        st.state.topic_count += 1;
        info!(topic = %id, name = %name, "📚 Topic created");
        Ok(id)
    }

    pub async fn set_topic_active(
        &self,
        caller: PublicKey,
        topic: TopicId,
        active: bool,
    ) -> Result<()> {
        let mut st = self.inner.write().await;
        if caller != st.state.authority {
            return Err(ProtocolError::InvalidAuthority);
        }
        let entry = st
            .topics
            .get_mut(&topic)
            .ok_or_else(|| ProtocolError::TopicNotFound(topic.to_string()))?;
        entry.is_active = active;
        info!(topic = %topic, active, "⚙️ Topic activity updated");
        Ok(())
    }

    pub async fn update_tokens_to_mint(
        &self,
        caller: PublicKey,
        new_tokens_to_mint: TokenAmount,
    ) -> Result<()> {
        let mut st = self.inner.write().await;
        if caller != st.state.authority {
            return Err(ProtocolError::InvalidAuthority);
        }
        let old = st.state.params.tokens_to_mint;
        st.state.params.tokens_to_mint = new_tokens_to_mint;
        info!(old = %old, new = %new_tokens_to_mint, "⚙️ tokens_to_mint updated");
        Ok(())
    }

    /// Administrative override of a link's phase window. The full ordering
    /// `commit_start ≤ commit_end ≤ reveal_start ≤ reveal_end` is
    /// validated before anything is written.
    pub async fn set_voting_phases(
        &self,
        caller: PublicKey,
        link: LinkId,
        commit_phase_start: Option<i64>,
        commit_phase_end: Option<i64>,
        reveal_phase_start: Option<i64>,
        reveal_phase_end: Option<i64>,
    ) -> Result<()> {
        let mut st = self.inner.write().await;
        if caller != st.state.authority {
            return Err(ProtocolError::InvalidAuthority);
        }
        let entry = st
            .links
            .get_mut(&link)
            .ok_or_else(|| ProtocolError::LinkNotFound(link.to_string()))?;

        let commit_start = commit_phase_start.unwrap_or(entry.commit_phase_start);
        let commit_end = commit_phase_end.unwrap_or(entry.commit_phase_end);
        let reveal_start = reveal_phase_start.unwrap_or(entry.reveal_phase_start);
        let reveal_end = reveal_phase_end.unwrap_or(entry.reveal_phase_end);

        if !(commit_start <= commit_end && commit_end <= reveal_start && reveal_start <= reveal_end)
        {
            return Err(ProtocolError::InvalidPhaseOrder);
        }

        entry.commit_phase_start = commit_start;
        entry.commit_phase_end = commit_end;
        entry.reveal_phase_start = reveal_start;
        entry.reveal_phase_end = reveal_end;
        info!(
            link = %link,
            commit_start,
            commit_end,
            reveal_start,
            reveal_end,
            "⚙️ Voting phases overridden"
        );
        Ok(())
    }

    // ---- submission flow ----

    pub async fn submit_data_to_topic(
        &self,
        contributor: PublicKey,
        topic: TopicId,
        data_reference: String,
        current_submission_index: u64,
    ) -> Result<SubmissionId> {
        let mut st = self.inner.write().await;

        if data_reference.is_empty() {
            return Err(ProtocolError::EmptyDataReference);
        }
        if data_reference.len() > MAX_DATA_REFERENCE_LEN {
            return Err(ProtocolError::DataReferenceTooLong(MAX_DATA_REFERENCE_LEN));
        }

        let topic_entry = require_topic(&st.topics, topic)?;
        if !topic_entry.is_active {
            return Err(ProtocolError::TopicInactive(topic.to_string()));
        }

        let profile = require_profile(&st.profiles, &contributor)?;
        if profile.submission_count != current_submission_index {
            return Err(ProtocolError::IncorrectSubmissionIndex {
                expected: profile.submission_count,
                provided: current_submission_index,
            });
        }

        let tokens_to_mint = st.state.params.tokens_to_mint;
        // Mints into the contributor's topic balance; fails (leaving the
        // ledger untouched) if that balance was never initialized.
        st.book.mint_temp_align(contributor, topic, tokens_to_mint)?;

        let id = SubmissionId::new(st.next_submission);
        st.next_submission += 1;
        let submission = Submission {
            id,
            contributor,
            timestamp: unix_now(),
            data_reference,
            user_submission_index: current_submission_index,
        };
        st.submissions.insert(id, submission);

        if let Some(profile) = st.profiles.get_mut(&contributor) {
            profile.submission_count += 1;
        }
        if let Some(topic_entry) = st.topics.get_mut(&topic) {
            topic_entry.submission_count += 1;
        }

        metrics::SUBMISSIONS_CREATED.inc();
        info!(
            submission = %id,
            contributor = %contributor,
            topic = %topic,
            minted = %tokens_to_mint,
            "📦 Data submitted"
        );
        Ok(id)
    }

    /// Attach a submission to a topic, opening its voting window. Callable
    /// by anyone; rejects duplicates.
    pub async fn link_submission_to_topic(
        &self,
        submission: SubmissionId,
        topic: TopicId,
    ) -> Result<LinkId> {
        let mut st = self.inner.write().await;

        if !st.submissions.contains_key(&submission) {
            return Err(ProtocolError::SubmissionNotFound(submission.to_string()));
        }
        let topic_entry = require_topic(&st.topics, topic)?;
        if !topic_entry.is_active {
            return Err(ProtocolError::TopicInactive(topic.to_string()));
        }
        if st.link_index.contains_key(&(submission, topic)) {
            return Err(ProtocolError::SubmissionAlreadyInTopic);
        }

        let now = unix_now();
        let commit_end = now + topic_entry.commit_phase_duration;
        let reveal_end = commit_end + topic_entry.reveal_phase_duration;

        let id = LinkId::new(st.next_link);
        st.next_link += 1;
        let link = SubmissionTopicLink {
            id,
            submission,
            topic,
            status: SubmissionStatus::Pending,
            commit_phase_start: now,
            commit_phase_end: commit_end,
            reveal_phase_start: commit_end,
            reveal_phase_end: reveal_end,
            yes_voting_power: TokenAmount::ZERO,
            no_voting_power: TokenAmount::ZERO,
            total_committed_votes: 0,
            total_revealed_votes: 0,
            ai_request_count: 0,
        };
        st.links.insert(id, link);
        st.link_index.insert((submission, topic), id);
        info!(
            link = %id,
            submission = %submission,
            topic = %topic,
            commit_end,
            reveal_end,
            "🔗 Submission linked to topic"
        );
        Ok(id)
    }

    /// Convert free tempAlign into topic-scoped tempRep, 1:1.
    pub async fn stake_topic_specific_tokens(
        &self,
        user: PublicKey,
        topic: TopicId,
        amount: TokenAmount,
    ) -> Result<()> {
        let mut st = self.inner.write().await;
        if amount.is_zero() {
            return Err(ProtocolError::ZeroStakeAmount);
        }
        require_topic(&st.topics, topic)?;
        require_profile(&st.profiles, &user)?;
        st.book.stake(user, topic, amount)?;
        Ok(())
    }

    // ---- reads ----

    pub async fn state(&self) -> ProtocolState {
        self.inner.read().await.state.clone()
    }

    pub async fn topic(&self, id: TopicId) -> Option<Topic> {
        self.inner.read().await.topics.get(&id).cloned()
    }

    pub async fn submission(&self, id: SubmissionId) -> Option<Submission> {
        self.inner.read().await.submissions.get(&id).cloned()
    }

    pub async fn link(&self, id: LinkId) -> Option<SubmissionTopicLink> {
        self.inner.read().await.links.get(&id).cloned()
    }

    pub async fn profile(&self, user: &PublicKey) -> Option<UserProfile> {
        self.inner.read().await.profiles.get(user).cloned()
    }

    pub async fn vote(&self, validator: &PublicKey, link: LinkId) -> Option<VoteCommit> {
        let st = self.inner.read().await;
        let id = st.vote_index.get(&(*validator, link))?;
        st.votes.get(id).cloned()
    }

    pub async fn ai_request(&self, id: RequestId) -> Option<AiValidationRequest> {
        self.inner.read().await.requests.get(&id).cloned()
    }

    /// Snapshot of every AI validation request, for the oracle's poll.
    pub async fn list_ai_requests(&self) -> Vec<AiValidationRequest> {
        self.inner.read().await.requests.values().cloned().collect()
    }

    pub async fn topic_balance(&self, user: &PublicKey, topic: TopicId) -> Option<TopicBalance> {
        self.inner.read().await.book.topic_balance(user, topic)
    }

    pub async fn holdings(&self, user: &PublicKey) -> Holdings {
        self.inner.read().await.book.holdings(user)
    }

    pub async fn supply(&self) -> SupplyLedger {
        *self.inner.read().await.book.supply()
    }
}

pub(crate) fn require_topic<'a>(
    topics: &'a BTreeMap<TopicId, Topic>,
    id: TopicId,
) -> Result<&'a Topic> {
    topics
        .get(&id)
        .ok_or_else(|| ProtocolError::TopicNotFound(id.to_string()))
}

pub(crate) fn require_profile<'a>(
    profiles: &'a HashMap<PublicKey, UserProfile>,
    user: &PublicKey,
) -> Result<&'a UserProfile> {
    profiles
        .get(user)
        .ok_or_else(|| ProtocolError::UserProfileNotFound(user.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> PublicKey {
        PublicKey::from_bytes([0xAA; 32])
    }

    fn oracle() -> PublicKey {
        PublicKey::from_bytes([0xBB; 32])
    }

    fn ledger() -> AlignmentLedger {
        AlignmentLedger::new(authority(), oracle(), ProtocolParams::default())
    }

    #[tokio::test]
    async fn test_create_topic_requires_authority() {
        let ledger = ledger();
        let outsider = PublicKey::from_bytes([1; 32]);

        let err = ledger
            .create_topic(outsider, "corpus".into(), "".into(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidAuthority));

        let id = ledger
            .create_topic(authority(), "corpus".into(), "desc".into(), None, None)
            .await
            .unwrap();
        assert_eq!(id, TopicId::new(0));
        assert_eq!(ledger.state().await.topic_count, 1);
    }

    #[tokio::test]
    async fn test_topic_name_validation() {
        let ledger = ledger();
        assert!(matches!(
            ledger
                .create_topic(authority(), String::new(), "d".into(), None, None)
                .await,
            Err(ProtocolError::EmptyTopicName)
        ));
        assert!(matches!(
            ledger
                .create_topic(authority(), "x".repeat(65), "d".into(), None, None)
                .await,
            Err(ProtocolError::TopicNameTooLong(_))
        ));
    }

    #[tokio::test]
    async fn test_register_user_once() {
        let ledger = ledger();
        let user = PublicKey::from_bytes([1; 32]);

        ledger.register_user(user).await.unwrap();
        assert!(matches!(
            ledger.register_user(user).await,
            Err(ProtocolError::UserProfileAlreadyInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_submission_index_must_match_profile_counter() {
        let ledger = ledger();
        let user = PublicKey::from_bytes([1; 32]);
        let topic = ledger
            .create_topic(authority(), "corpus".into(), "d".into(), None, None)
            .await
            .unwrap();
        ledger.register_user(user).await.unwrap();
        ledger
            .initialize_user_topic_balance(user, topic)
            .await
            .unwrap();

        assert!(matches!(
            ledger
                .submit_data_to_topic(user, topic, "ipfs://a".into(), 3)
                .await,
            Err(ProtocolError::IncorrectSubmissionIndex { expected: 0, provided: 3 })
        ));

        ledger
            .submit_data_to_topic(user, topic, "ipfs://a".into(), 0)
            .await
            .unwrap();
        ledger
            .submit_data_to_topic(user, topic, "ipfs://b".into(), 1)
            .await
            .unwrap();

        assert_eq!(ledger.profile(&user).await.unwrap().submission_count, 2);
        // Each submission minted tokens_to_mint tempAlign.
        let balance = ledger.topic_balance(&user, topic).await.unwrap();
        assert_eq!(balance.temp_align, TokenAmount::new(200));
    }

    #[tokio::test]
    async fn test_inactive_topic_rejects_submissions() {
        let ledger = ledger();
        let user = PublicKey::from_bytes([1; 32]);
        let topic = ledger
            .create_topic(authority(), "corpus".into(), "d".into(), None, None)
            .await
            .unwrap();
        ledger.register_user(user).await.unwrap();
        ledger
            .initialize_user_topic_balance(user, topic)
            .await
            .unwrap();
        ledger
            .set_topic_active(authority(), topic, false)
            .await
            .unwrap();

        assert!(matches!(
            ledger
                .submit_data_to_topic(user, topic, "ipfs://a".into(), 0)
                .await,
            Err(ProtocolError::TopicInactive(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_link_rejected() {
        let ledger = ledger();
        let user = PublicKey::from_bytes([1; 32]);
        let topic = ledger
            .create_topic(authority(), "corpus".into(), "d".into(), None, None)
            .await
            .unwrap();
        ledger.register_user(user).await.unwrap();
        ledger
            .initialize_user_topic_balance(user, topic)
            .await
            .unwrap();
        let submission = ledger
            .submit_data_to_topic(user, topic, "ipfs://a".into(), 0)
            .await
            .unwrap();

        ledger
            .link_submission_to_topic(submission, topic)
            .await
            .unwrap();
        assert!(matches!(
            ledger.link_submission_to_topic(submission, topic).await,
            Err(ProtocolError::SubmissionAlreadyInTopic)
        ));
    }

    #[tokio::test]
    async fn test_update_tokens_to_mint_affects_later_submissions() {
        let ledger = ledger();
        let user = PublicKey::from_bytes([1; 32]);
        let topic = ledger
            .create_topic(authority(), "corpus".into(), "d".into(), None, None)
            .await
            .unwrap();
        ledger.register_user(user).await.unwrap();
        ledger
            .initialize_user_topic_balance(user, topic)
            .await
            .unwrap();

        ledger
            .submit_data_to_topic(user, topic, "ipfs://a".into(), 0)
            .await
            .unwrap();
        ledger
            .update_tokens_to_mint(authority(), TokenAmount::new(7))
            .await
            .unwrap();
        ledger
            .submit_data_to_topic(user, topic, "ipfs://b".into(), 1)
            .await
            .unwrap();

        let balance = ledger.topic_balance(&user, topic).await.unwrap();
        assert_eq!(balance.temp_align, TokenAmount::new(107));
    }

    #[tokio::test]
    async fn test_set_voting_phases_validates_order() {
        let ledger = ledger();
        let user = PublicKey::from_bytes([1; 32]);
        let topic = ledger
            .create_topic(authority(), "corpus".into(), "d".into(), None, None)
            .await
            .unwrap();
        ledger.register_user(user).await.unwrap();
        ledger
            .initialize_user_topic_balance(user, topic)
            .await
            .unwrap();
        let submission = ledger
            .submit_data_to_topic(user, topic, "ipfs://a".into(), 0)
            .await
            .unwrap();
        let link = ledger
            .link_submission_to_topic(submission, topic)
            .await
            .unwrap();

        // reveal_end before reveal_start is rejected, link untouched.
        let before = ledger.link(link).await.unwrap();
        assert!(matches!(
            ledger
                .set_voting_phases(authority(), link, None, None, Some(100), Some(50))
                .await,
            Err(ProtocolError::InvalidPhaseOrder)
        ));
        let after = ledger.link(link).await.unwrap();
        assert_eq!(before.reveal_phase_start, after.reveal_phase_start);
        assert_eq!(before.reveal_phase_end, after.reveal_phase_end);
    }
}
