use crate::error::{EconomicsError, Result};
use crate::supply::SupplyLedger;
use crate::types::{TokenEvent, TokenEventReason, TokenKind};
use align_types::{PublicKey, TokenAmount, TopicId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Per-user, per-topic temporary token ledger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TopicBalance {
    /// Temporary alignment tokens earned by submitting to this topic.
    pub temp_align: TokenAmount,
    /// Temporary reputation tokens free for voting or AI-request staking.
    pub temp_rep: TokenAmount,
    /// Temporary reputation committed to open votes. Equals the sum of
    /// `vote_amount` across the user's non-finalized temporary-stake
    /// commitments in this topic.
    pub locked_temp_rep: TokenAmount,
}

/// A user's permanent, transferable token holdings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Holdings {
    pub align: TokenAmount,
    pub rep: TokenAmount,
}

/// All token balances, custody state and supply totals.
///
/// The book performs no locking of its own: the owning ledger serializes
/// instruction execution, and every method validates fully before
/// mutating, so a returned error always leaves the book untouched.
#[derive(Debug, Default)]
pub struct BalanceBook {
    topic_balances: HashMap<(PublicKey, TopicId), TopicBalance>,
    holdings: HashMap<PublicKey, Holdings>,
    supply: SupplyLedger,
    events: Vec<TokenEvent>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the per-(user, topic) balance entry. Staking, voting and
    /// AI-request instructions require this to exist.
    pub fn initialize_topic_balance(&mut self, user: PublicKey, topic: TopicId) -> Result<()> {
        if self.topic_balances.contains_key(&(user, topic)) {
            return Err(EconomicsError::BalanceAlreadyInitialized {
                user: user.to_string(),
                topic: topic.to_string(),
            });
        }
        self.topic_balances
            .insert((user, topic), TopicBalance::default());
        debug!(user = %user, topic = %topic, "Topic balance initialized");
        Ok(())
    }

    pub fn topic_balance(&self, user: &PublicKey, topic: TopicId) -> Option<TopicBalance> {
        self.topic_balances.get(&(*user, topic)).copied()
    }

    pub fn is_topic_balance_initialized(&self, user: &PublicKey, topic: TopicId) -> bool {
        self.topic_balances.contains_key(&(*user, topic))
    }

    pub fn holdings(&self, user: &PublicKey) -> Holdings {
        self.holdings.get(user).copied().unwrap_or_default()
    }

    pub fn supply(&self) -> &SupplyLedger {
        &self.supply
    }

    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    /// Mint tempAlign into a contributor's topic balance (submission
    /// creation).
    pub fn mint_temp_align(
        &mut self,
        user: PublicKey,
        topic: TopicId,
        amount: TokenAmount,
    ) -> Result<()> {
        let balance = self.require_balance_mut(&user, topic)?;
        balance.temp_align = balance
            .temp_align
            .checked_add(amount)
            .ok_or(EconomicsError::Overflow)?;

        self.supply.record_mint(TokenKind::TempAlign, amount);
        self.record_event(
            user,
            Some(topic),
            TokenKind::TempAlign,
            amount,
            TokenAmount::ZERO,
            TokenEventReason::SubmissionMint,
        );
        info!(user = %user, topic = %topic, amount = %amount, "💰 tempAlign minted");
        Ok(())
    }

    /// Convert free tempAlign into topic-scoped tempRep, 1:1.
    pub fn stake(&mut self, user: PublicKey, topic: TopicId, amount: TokenAmount) -> Result<()> {
        let balance = self.require_balance_mut(&user, topic)?;
        if balance.temp_align < amount {
            return Err(EconomicsError::InsufficientBalance {
                kind: TokenKind::TempAlign,
                available: balance.temp_align,
                needed: amount,
            });
        }

        balance.temp_align = balance.temp_align.saturating_sub(amount);
        balance.temp_rep = balance
            .temp_rep
            .checked_add(amount)
            .ok_or(EconomicsError::Overflow)?;

        self.supply.record_burn(TokenKind::TempAlign, amount);
        self.supply.record_mint(TokenKind::TempRep, amount);
        self.record_event(
            user,
            Some(topic),
            TokenKind::TempRep,
            amount,
            amount,
            TokenEventReason::Stake,
        );
        info!(user = %user, topic = %topic, amount = %amount, "🔄 tempAlign staked into tempRep");
        Ok(())
    }

    /// Move free tempRep to the locked pool (vote commitment with a
    /// temporary stake).
    pub fn lock_temp_rep(
        &mut self,
        user: PublicKey,
        topic: TopicId,
        amount: TokenAmount,
    ) -> Result<()> {
        let balance = self.require_balance_mut(&user, topic)?;
        if balance.temp_rep < amount {
            return Err(EconomicsError::InsufficientBalance {
                kind: TokenKind::TempRep,
                available: balance.temp_rep,
                needed: amount,
            });
        }

        balance.temp_rep = balance.temp_rep.saturating_sub(amount);
        balance.locked_temp_rep = balance
            .locked_temp_rep
            .checked_add(amount)
            .ok_or(EconomicsError::Overflow)?;
        info!(user = %user, topic = %topic, amount = %amount, "🔒 tempRep locked for vote");
        Ok(())
    }

    /// Spend free tempRep immediately (AI-validation request stake). The
    /// amount is deducted, not locked: it is custodied by the request.
    pub fn spend_temp_rep(
        &mut self,
        user: PublicKey,
        topic: TopicId,
        amount: TokenAmount,
    ) -> Result<()> {
        let balance = self.require_balance_mut(&user, topic)?;
        if balance.temp_rep < amount {
            return Err(EconomicsError::InsufficientBalance {
                kind: TokenKind::TempRep,
                available: balance.temp_rep,
                needed: amount,
            });
        }

        balance.temp_rep = balance.temp_rep.saturating_sub(amount);
        self.supply.record_burn(TokenKind::TempRep, amount);
        self.record_event(
            user,
            Some(topic),
            TokenKind::TempRep,
            TokenAmount::ZERO,
            amount,
            TokenEventReason::AiRequestStake,
        );
        info!(user = %user, topic = %topic, amount = %amount, "💸 tempRep spent on AI request");
        Ok(())
    }

    /// Burn tempAlign up to `cap` and mint the same amount of permanent
    /// Align to the contributor (accepted submission). Returns the
    /// converted amount, which may be less than `cap` if some tempAlign
    /// was already staked away.
    pub fn convert_temp_align(
        &mut self,
        user: PublicKey,
        topic: TopicId,
        cap: TokenAmount,
    ) -> Result<TokenAmount> {
        let balance = self.require_balance_mut(&user, topic)?;
        let converted = balance.temp_align.min(cap);
        balance.temp_align = balance.temp_align.saturating_sub(converted);

        let holdings = self.holdings.entry(user).or_default();
        holdings.align = holdings
            .align
            .checked_add(converted)
            .ok_or(EconomicsError::Overflow)?;

        self.supply.record_burn(TokenKind::TempAlign, converted);
        self.supply.record_mint(TokenKind::Align, converted);
        self.record_event(
            user,
            Some(topic),
            TokenKind::Align,
            converted,
            converted,
            TokenEventReason::SubmissionConversion,
        );
        info!(
            user = %user,
            topic = %topic,
            amount = %converted,
            "✅ tempAlign converted to permanent Align"
        );
        Ok(converted)
    }

    /// Burn locked tempRep and mint equal permanent Rep (correct vote).
    pub fn reward_locked_temp_rep(
        &mut self,
        user: PublicKey,
        topic: TopicId,
        amount: TokenAmount,
    ) -> Result<()> {
        self.take_locked_temp_rep(&user, topic, amount)?;

        let holdings = self.holdings.entry(user).or_default();
        holdings.rep = holdings
            .rep
            .checked_add(amount)
            .ok_or(EconomicsError::Overflow)?;

        self.supply.record_mint(TokenKind::Rep, amount);
        self.record_event(
            user,
            Some(topic),
            TokenKind::Rep,
            amount,
            amount,
            TokenEventReason::VoteReward,
        );
        info!(user = %user, topic = %topic, amount = %amount, "🏆 locked tempRep converted to Rep");
        Ok(())
    }

    /// Burn locked tempRep with no replacement (incorrect or unrevealed
    /// vote).
    pub fn slash_locked_temp_rep(
        &mut self,
        user: PublicKey,
        topic: TopicId,
        amount: TokenAmount,
    ) -> Result<()> {
        self.take_locked_temp_rep(&user, topic, amount)?;
        self.record_event(
            user,
            Some(topic),
            TokenKind::TempRep,
            TokenAmount::ZERO,
            amount,
            TokenEventReason::VoteSlash,
        );
        info!(user = %user, topic = %topic, amount = %amount, "🔥 locked tempRep slashed");
        Ok(())
    }

    fn take_locked_temp_rep(
        &mut self,
        user: &PublicKey,
        topic: TopicId,
        amount: TokenAmount,
    ) -> Result<()> {
        let balance = self.require_balance_mut(user, topic)?;
        if balance.locked_temp_rep < amount {
            return Err(EconomicsError::InsufficientLockedBalance {
                kind: TokenKind::TempRep,
                available: balance.locked_temp_rep,
                needed: amount,
            });
        }
        balance.locked_temp_rep = balance.locked_temp_rep.saturating_sub(amount);
        self.supply.record_burn(TokenKind::TempRep, amount);
        Ok(())
    }

    fn require_balance_mut(
        &mut self,
        user: &PublicKey,
        topic: TopicId,
    ) -> Result<&mut TopicBalance> {
        self.topic_balances.get_mut(&(*user, topic)).ok_or_else(|| {
            EconomicsError::BalanceNotInitialized {
                user: user.to_string(),
                topic: topic.to_string(),
            }
        })
    }

    fn record_event(
        &mut self,
        user: PublicKey,
        topic: Option<TopicId>,
        kind: TokenKind,
        minted: TokenAmount,
        burned: TokenAmount,
        reason: TokenEventReason,
    ) {
        self.events.push(TokenEvent {
            user,
            topic,
            kind,
            minted,
            burned,
            reason,
            timestamp: Utc::now(),
        });
    }
}
