//! Core governance engine: proposal creation, token-weighted voting, and
//! quorum-gated execution.
//!
//! Every operation validates fully before touching the store, so a rejected
//! call leaves the state exactly as it was. Heights are supplied per call and
//! balances are read through a [`BalanceSource`] at call time.

use daocore_types::{BalanceSource, BlockHeight, Principal, ProposalId, TokenAmount};

use crate::config::{validate_proposal_duration, validate_quorum_threshold, GovernanceConfig};
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalRequest, ProposalStatus, ProposalType, Tally};
use crate::store::GovernanceStore;

/// The governance state machine over a store and a balance lookup.
pub struct GovernanceEngine<B> {
    store: GovernanceStore,
    balances: B,
}

impl<B: BalanceSource> GovernanceEngine<B> {
    /// Start with an empty store.
    pub fn new(config: GovernanceConfig, balances: B) -> Result<Self, GovernanceError> {
        config.validate()?;
        Ok(Self::from_store(GovernanceStore::new(config), balances))
    }

    /// Resume from an existing (e.g. snapshot-restored) store.
    pub fn from_store(store: GovernanceStore, balances: B) -> Self {
        Self { store, balances }
    }

    pub fn store(&self) -> &GovernanceStore {
        &self.store
    }

    pub fn config(&self) -> &GovernanceConfig {
        self.store.config()
    }

    // ── Configuration admin ────────────────────────────────────────────

    /// Set the collaborator that carries out executed proposals.
    pub fn set_executor(
        &mut self,
        caller: &Principal,
        executor: Principal,
    ) -> Result<(), GovernanceError> {
        self.ensure_admin("set_executor", caller)?;
        tracing::info!(admin = %caller, executor = %executor, "executor set");
        self.store.config_mut().executor = Some(executor);
        Ok(())
    }

    /// Change the voting window for proposals created from now on.
    pub fn set_proposal_duration(
        &mut self,
        caller: &Principal,
        blocks: u64,
    ) -> Result<(), GovernanceError> {
        self.ensure_admin("set_proposal_duration", caller)?;
        validate_proposal_duration(blocks).inspect_err(|e| rejected("set_proposal_duration", e))?;
        tracing::info!(admin = %caller, blocks, "proposal duration set");
        self.store.config_mut().proposal_duration = blocks;
        Ok(())
    }

    /// Change the quorum percentage. Applies to every later execution,
    /// including proposals created before the change.
    pub fn set_quorum_threshold(
        &mut self,
        caller: &Principal,
        percent: u32,
    ) -> Result<(), GovernanceError> {
        self.ensure_admin("set_quorum_threshold", caller)?;
        validate_quorum_threshold(percent).inspect_err(|e| rejected("set_quorum_threshold", e))?;
        tracing::info!(admin = %caller, percent, "quorum threshold set");
        self.store.config_mut().quorum_threshold = percent;
        Ok(())
    }

    fn ensure_admin(&self, op: &'static str, caller: &Principal) -> Result<(), GovernanceError> {
        if caller == &self.store.config().admin {
            Ok(())
        } else {
            let err = GovernanceError::NotAuthorized(caller.clone());
            rejected(op, &err);
            Err(err)
        }
    }

    // ── Proposal lifecycle ─────────────────────────────────────────────

    /// Create a proposal whose voting window opens at `now`.
    ///
    /// Checks, in order: proposal cap, request fields, caller holds tokens,
    /// title never used before, window end fits in a block height.
    pub fn create_proposal(
        &mut self,
        caller: &Principal,
        request: ProposalRequest,
        now: BlockHeight,
    ) -> Result<ProposalId, GovernanceError> {
        let (proposal_type, end_height) = self
            .check_new_proposal(caller, &request, now)
            .inspect_err(|e| rejected("create_proposal", e))?;

        let id = self.store.next_proposal_id();
        let proposal = Proposal {
            id,
            title: request.title,
            description: request.description,
            proposer: caller.clone(),
            start_height: now,
            end_height,
            proposal_type,
            rule_change: request.rule_change,
            reward_amount: request.reward_amount,
            zone: request.zone,
            yes_votes: TokenAmount::ZERO,
            no_votes: TokenAmount::ZERO,
            executed: false,
            status: ProposalStatus::Active,
        };
        tracing::info!(
            proposal = %id,
            proposer = %caller,
            kind = %proposal_type,
            end_height = %proposal.end_height,
            "proposal created"
        );
        self.store.insert_proposal(proposal);
        Ok(id)
    }

    fn check_new_proposal(
        &self,
        caller: &Principal,
        request: &ProposalRequest,
        now: BlockHeight,
    ) -> Result<(ProposalType, BlockHeight), GovernanceError> {
        let config = self.store.config();
        if self.store.proposal_count() >= config.max_proposals {
            return Err(GovernanceError::MaxProposalsExceeded(config.max_proposals));
        }
        let proposal_type = request.validate()?;
        if self.balances.balance_of(caller).is_zero() {
            return Err(GovernanceError::NotTokenHolder(caller.clone()));
        }
        if self.store.has_title(&request.title) {
            return Err(GovernanceError::ProposalAlreadyExists(request.title.clone()));
        }
        let end_height = now
            .checked_add(config.proposal_duration)
            .ok_or(GovernanceError::InvalidTimestamp)?;
        Ok((proposal_type, end_height))
    }

    // ── Voting ─────────────────────────────────────────────────────────

    /// Cast a yes (`true`) or no (`false`) vote weighted by the caller's
    /// current balance. Later balance changes do not affect the tally.
    pub fn vote_on_proposal(
        &mut self,
        caller: &Principal,
        id: ProposalId,
        choice: bool,
        now: BlockHeight,
    ) -> Result<(), GovernanceError> {
        let weight = self
            .check_vote(caller, id, now)
            .inspect_err(|e| rejected("vote_on_proposal", e))?;
        tracing::info!(proposal = %id, voter = %caller, choice, %weight, "vote recorded");
        self.store.record_vote(id, caller.clone(), choice, weight);
        Ok(())
    }

    /// Returns the caller's voting weight if the vote may be recorded.
    fn check_vote(
        &self,
        caller: &Principal,
        id: ProposalId,
        now: BlockHeight,
    ) -> Result<TokenAmount, GovernanceError> {
        let proposal = self.find(id)?;
        if !proposal.is_voting_open(now) {
            return Err(GovernanceError::VotingClosed(id));
        }
        if self.store.has_voted(id, caller) {
            return Err(GovernanceError::AlreadyVoted {
                proposal: id,
                voter: caller.clone(),
            });
        }
        let weight = self.balances.balance_of(caller);
        if weight.is_zero() {
            return Err(GovernanceError::NotTokenHolder(caller.clone()));
        }
        Ok(weight)
    }

    // ── Execution gate ─────────────────────────────────────────────────

    /// Mark a proposal executed once its window has closed and quorum is met.
    ///
    /// Only the status changes; carrying out the proposal is the executor's job.
    pub fn execute_proposal(
        &mut self,
        id: ProposalId,
        now: BlockHeight,
    ) -> Result<(), GovernanceError> {
        self.check_execution(id, now)
            .inspect_err(|e| rejected("execute_proposal", e))?;
        tracing::info!(proposal = %id, height = %now, "proposal executed");
        self.store.mark_executed(id);
        Ok(())
    }

    fn check_execution(&self, id: ProposalId, now: BlockHeight) -> Result<(), GovernanceError> {
        let proposal = self.find(id)?;
        if !proposal.has_voting_ended(now) {
            return Err(GovernanceError::VotingClosed(id));
        }
        if proposal.executed {
            return Err(GovernanceError::ProposalExecuted(id));
        }
        let threshold = self.store.config().quorum_threshold;
        if !proposal.meets_quorum(threshold) {
            return Err(GovernanceError::QuorumNotReached {
                yes: proposal.yes_votes,
                required: proposal.quorum_requirement(threshold),
            });
        }
        if self.store.config().executor.is_none() {
            return Err(GovernanceError::AuthorityNotSet);
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Number of proposals ever created.
    pub fn proposal_count(&self) -> u64 {
        self.store.proposal_count()
    }

    /// Whether any proposal, past or present, used this title.
    pub fn proposal_exists(&self, title: &str) -> bool {
        self.store.has_title(title)
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.store.proposal(id)
    }

    pub fn proposal_id_by_title(&self, title: &str) -> Option<ProposalId> {
        self.store.proposal_id_by_title(title)
    }

    pub fn vote_of(&self, id: ProposalId, voter: &Principal) -> Option<bool> {
        self.store.vote_of(id, voter)
    }

    /// Current vote counts and quorum standing as of `now`.
    pub fn tally(&self, id: ProposalId, now: BlockHeight) -> Result<Tally, GovernanceError> {
        let proposal = self.find(id)?;
        Ok(Tally::of(proposal, self.store.config().quorum_threshold, now))
    }

    fn find(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.store
            .proposal(id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }
}

fn rejected(op: &'static str, err: &GovernanceError) {
    tracing::debug!(op, code = err.code(), kind = err.kind(), "rejected: {err}");
}
