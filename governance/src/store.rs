//! The governance record set: configuration, proposals, votes, and the title index.
//!
//! All mutation goes through `pub(crate)` methods used by the engine, which
//! validates everything before calling them. The title index is only ever
//! written together with the proposal table.

use std::collections::BTreeMap;

use daocore_types::{Principal, ProposalId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::config::GovernanceConfig;
use crate::error::StoreError;
use crate::proposal::{Proposal, ProposalStatus};

/// In-memory governance state. Persisting it is left to the host via
/// [`to_snapshot`](Self::to_snapshot) / [`from_snapshot`](Self::from_snapshot).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceStore {
    config: GovernanceConfig,
    /// Id of the next proposal; also the number of proposals ever created.
    next_proposal_id: u64,
    proposals: BTreeMap<ProposalId, Proposal>,
    /// (proposal, voter) -> choice. Write-once.
    votes: BTreeMap<(ProposalId, Principal), bool>,
    titles: BTreeMap<String, ProposalId>,
}

impl GovernanceStore {
    pub fn new(config: GovernanceConfig) -> Self {
        Self {
            config,
            next_proposal_id: 0,
            proposals: BTreeMap::new(),
            votes: BTreeMap::new(),
            titles: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut GovernanceConfig {
        &mut self.config
    }

    pub fn next_proposal_id(&self) -> ProposalId {
        ProposalId::new(self.next_proposal_id)
    }

    /// Number of proposals ever created.
    pub fn proposal_count(&self) -> u64 {
        self.next_proposal_id
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.titles.contains_key(title)
    }

    pub fn proposal_id_by_title(&self, title: &str) -> Option<ProposalId> {
        self.titles.get(title).copied()
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Principal) -> bool {
        self.votes.contains_key(&(id, voter.clone()))
    }

    pub fn vote_of(&self, id: ProposalId, voter: &Principal) -> Option<bool> {
        self.votes.get(&(id, voter.clone())).copied()
    }

    /// Insert a new proposal under the next id, index its title, and advance
    /// the counter.
    pub(crate) fn insert_proposal(&mut self, proposal: Proposal) {
        debug_assert_eq!(proposal.id.as_u64(), self.next_proposal_id);
        debug_assert!(!self.titles.contains_key(&proposal.title));
        self.titles.insert(proposal.title.clone(), proposal.id);
        self.proposals.insert(proposal.id, proposal);
        self.next_proposal_id += 1;
    }

    /// Record a vote and add `weight` to the matching tally.
    ///
    /// The caller has already checked that the proposal exists and that the
    /// voter has not voted.
    pub(crate) fn record_vote(
        &mut self,
        id: ProposalId,
        voter: Principal,
        choice: bool,
        weight: TokenAmount,
    ) {
        if let Some(proposal) = self.proposals.get_mut(&id) {
            // u128 tallies are bounded by total token supply.
            if choice {
                proposal.yes_votes = proposal.yes_votes.saturating_add(weight);
            } else {
                proposal.no_votes = proposal.no_votes.saturating_add(weight);
            }
            self.votes.insert((id, voter), choice);
        }
    }

    /// Flip a proposal to executed.
    pub(crate) fn mark_executed(&mut self, id: ProposalId) {
        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.executed = true;
            proposal.status = ProposalStatus::Executed;
        }
    }

    /// Encode the whole store with bincode.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode a snapshot and re-check every store invariant.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, StoreError> {
        let store: Self =
            bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        store.check_invariants()?;
        Ok(store)
    }

    fn check_invariants(&self) -> Result<(), StoreError> {
        self.config
            .validate()
            .map_err(|e| StoreError::Corruption(format!("config: {e}")))?;

        if self.next_proposal_id > self.config.max_proposals {
            return Err(StoreError::Corruption(format!(
                "proposal counter {} exceeds cap {}",
                self.next_proposal_id, self.config.max_proposals
            )));
        }
        if self.proposals.len() != self.titles.len() {
            return Err(StoreError::Corruption(format!(
                "{} proposals but {} indexed titles",
                self.proposals.len(),
                self.titles.len()
            )));
        }

        for (id, proposal) in &self.proposals {
            if proposal.id != *id || id.as_u64() >= self.next_proposal_id {
                return Err(StoreError::Corruption(format!("proposal {id} is misfiled")));
            }
            if self.titles.get(&proposal.title) != Some(id) {
                return Err(StoreError::Corruption(format!(
                    "title index does not point at proposal {id}"
                )));
            }
            if proposal.end_height <= proposal.start_height {
                return Err(StoreError::Corruption(format!(
                    "proposal {id} window ends at or before it starts"
                )));
            }
            let executed_status = proposal.status == ProposalStatus::Executed;
            if proposal.executed != executed_status {
                return Err(StoreError::Corruption(format!(
                    "proposal {id} executed flag disagrees with status"
                )));
            }
        }

        if let Some((id, voter)) = self
            .votes
            .keys()
            .find(|(id, _)| !self.proposals.contains_key(id))
        {
            return Err(StoreError::Corruption(format!(
                "vote by {voter} references missing proposal {id}"
            )));
        }
        Ok(())
    }
}
