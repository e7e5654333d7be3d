//! Thread-safe handle that serializes access to one engine.
//!
//! The engine assumes strictly sequential operations: the double-vote guard and
//! tally updates are not safe under interleaved writers. Hosts that serve
//! requests concurrently share a [`SharedGovernance`] instead.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use daocore_types::{BalanceSource, BlockHeight, Principal, ProposalId};

use crate::engine::GovernanceEngine;
use crate::error::{GovernanceError, StoreError};
use crate::proposal::{Proposal, ProposalRequest, Tally};

/// A cloneable, single-writer handle to a [`GovernanceEngine`].
pub struct SharedGovernance<B> {
    inner: Arc<Mutex<GovernanceEngine<B>>>,
}

impl<B> Clone for SharedGovernance<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: BalanceSource> SharedGovernance<B> {
    pub fn new(engine: GovernanceEngine<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut GovernanceEngine<B>) -> R) -> R {
        f(&mut self.lock())
    }

    // Operations validate before mutating, so a panic while holding the lock
    // cannot leave a half-applied change behind.
    fn lock(&self) -> MutexGuard<'_, GovernanceEngine<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_executor(
        &self,
        caller: &Principal,
        executor: Principal,
    ) -> Result<(), GovernanceError> {
        self.lock().set_executor(caller, executor)
    }

    pub fn set_proposal_duration(
        &self,
        caller: &Principal,
        blocks: u64,
    ) -> Result<(), GovernanceError> {
        self.lock().set_proposal_duration(caller, blocks)
    }

    pub fn set_quorum_threshold(
        &self,
        caller: &Principal,
        percent: u32,
    ) -> Result<(), GovernanceError> {
        self.lock().set_quorum_threshold(caller, percent)
    }

    pub fn create_proposal(
        &self,
        caller: &Principal,
        request: ProposalRequest,
        now: BlockHeight,
    ) -> Result<ProposalId, GovernanceError> {
        self.lock().create_proposal(caller, request, now)
    }

    pub fn vote_on_proposal(
        &self,
        caller: &Principal,
        id: ProposalId,
        choice: bool,
        now: BlockHeight,
    ) -> Result<(), GovernanceError> {
        self.lock().vote_on_proposal(caller, id, choice, now)
    }

    pub fn execute_proposal(
        &self,
        id: ProposalId,
        now: BlockHeight,
    ) -> Result<(), GovernanceError> {
        self.lock().execute_proposal(id, now)
    }

    pub fn proposal_count(&self) -> u64 {
        self.lock().proposal_count()
    }

    pub fn proposal_exists(&self, title: &str) -> bool {
        self.lock().proposal_exists(title)
    }

    /// A copy of the proposal record as of now.
    pub fn proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.lock().proposal(id).cloned()
    }

    pub fn tally(&self, id: ProposalId, now: BlockHeight) -> Result<Tally, GovernanceError> {
        self.lock().tally(id, now)
    }

    /// Consistent snapshot of the whole store.
    pub fn snapshot(&self) -> Result<Vec<u8>, StoreError> {
        self.lock().store().to_snapshot()
    }
}
