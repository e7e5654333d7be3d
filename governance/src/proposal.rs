//! Governance proposals and their lifecycle.

use std::fmt;
use std::str::FromStr;

use daocore_types::{BlockHeight, Principal, ProposalId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::config::{MAX_DESCRIPTION_LEN, MAX_RULE_CHANGE_LEN, MAX_TITLE_LEN, MAX_ZONE_LEN};
use crate::error::GovernanceError;

/// What kind of change a proposal asks for.
///
/// The payload fields on [`Proposal`] are not cross-checked against the type;
/// interpreting them is the executor's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalType {
    RuleChange,
    RewardDist,
    ZoneUpdate,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleChange => "rule-change",
            Self::RewardDist => "reward-dist",
            Self::ZoneUpdate => "zone-update",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rule-change" => Ok(Self::RuleChange),
            "reward-dist" => Ok(Self::RewardDist),
            "zone-update" => Ok(Self::ZoneUpdate),
            other => Err(GovernanceError::InvalidProposalType(other.to_string())),
        }
    }
}

/// Lifecycle status. A proposal moves `Active -> Executed` at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Active,
    Executed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Executed => "executed",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    /// Who proposed it.
    pub proposer: Principal,
    /// Height at creation; voting opens here.
    pub start_height: BlockHeight,
    /// Last height at which votes are accepted. Fixed at creation.
    pub end_height: BlockHeight,
    pub proposal_type: ProposalType,
    pub rule_change: Option<String>,
    pub reward_amount: Option<TokenAmount>,
    pub zone: Option<String>,
    /// Sum of the balances of yes voters at the time they voted.
    pub yes_votes: TokenAmount,
    /// Sum of the balances of no voters at the time they voted.
    pub no_votes: TokenAmount,
    pub executed: bool,
    pub status: ProposalStatus,
}

impl Proposal {
    /// Total voting weight cast.
    pub fn turnout(&self) -> TokenAmount {
        self.yes_votes.saturating_add(self.no_votes)
    }

    /// Votes are accepted through `end_height` inclusive, and never after execution.
    pub fn is_voting_open(&self, now: BlockHeight) -> bool {
        now <= self.end_height && !self.executed
    }

    /// Execution becomes possible strictly after `end_height`.
    pub fn has_voting_ended(&self, now: BlockHeight) -> bool {
        now > self.end_height
    }

    /// Yes votes needed for execution: `turnout * threshold / 100`, truncated.
    pub fn quorum_requirement(&self, quorum_threshold: u32) -> TokenAmount {
        self.turnout().percent(quorum_threshold)
    }

    /// Yes votes are compared against a share of turnout; there is no
    /// separate yes-over-no majority rule.
    pub fn meets_quorum(&self, quorum_threshold: u32) -> bool {
        self.yes_votes >= self.quorum_requirement(quorum_threshold)
    }
}

/// Caller-supplied fields for a new proposal.
///
/// The type is kept as raw text so that an unknown name is reported as
/// `InvalidProposalType` in its proper place in the validation order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub title: String,
    pub description: String,
    pub proposal_type: String,
    #[serde(default)]
    pub rule_change: Option<String>,
    #[serde(default)]
    pub reward_amount: Option<TokenAmount>,
    #[serde(default)]
    pub zone: Option<String>,
}

impl ProposalRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        proposal_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            proposal_type: proposal_type.into(),
            rule_change: None,
            reward_amount: None,
            zone: None,
        }
    }

    pub fn with_rule_change(mut self, rule_change: impl Into<String>) -> Self {
        self.rule_change = Some(rule_change.into());
        self
    }

    pub fn with_reward_amount(mut self, amount: impl Into<TokenAmount>) -> Self {
        self.reward_amount = Some(amount.into());
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Check the caller-supplied fields in order and return the parsed type.
    ///
    /// Lengths count Unicode scalar values. Store-dependent checks (proposal
    /// cap, balance, title uniqueness) belong to the engine.
    pub fn validate(&self) -> Result<ProposalType, GovernanceError> {
        if !within(&self.title, MAX_TITLE_LEN) {
            return Err(GovernanceError::InvalidDescription("title"));
        }
        if !within(&self.description, MAX_DESCRIPTION_LEN) {
            return Err(GovernanceError::InvalidDescription("description"));
        }
        let proposal_type: ProposalType = self.proposal_type.parse()?;
        if let Some(rule_change) = &self.rule_change {
            if rule_change.chars().count() > MAX_RULE_CHANGE_LEN {
                return Err(GovernanceError::InvalidRuleChange);
            }
        }
        if self.reward_amount.is_some_and(|amount| amount.is_zero()) {
            return Err(GovernanceError::InvalidRewardAmount);
        }
        if let Some(zone) = &self.zone {
            if zone.chars().count() > MAX_ZONE_LEN {
                return Err(GovernanceError::InvalidZone);
            }
        }
        Ok(proposal_type)
    }
}

fn within(text: &str, max: usize) -> bool {
    !text.is_empty() && text.chars().count() <= max
}

/// Snapshot of a proposal's vote counts under the current quorum threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub proposal: ProposalId,
    pub yes_votes: TokenAmount,
    pub no_votes: TokenAmount,
    pub turnout: TokenAmount,
    pub quorum_threshold: u32,
    pub required_yes: TokenAmount,
    pub quorum_reached: bool,
    pub voting_open: bool,
    pub status: ProposalStatus,
}

impl Tally {
    pub fn of(proposal: &Proposal, quorum_threshold: u32, now: BlockHeight) -> Self {
        Self {
            proposal: proposal.id,
            yes_votes: proposal.yes_votes,
            no_votes: proposal.no_votes,
            turnout: proposal.turnout(),
            quorum_threshold,
            required_yes: proposal.quorum_requirement(quorum_threshold),
            quorum_reached: proposal.meets_quorum(quorum_threshold),
            voting_open: proposal.is_voting_open(now),
            status: proposal.status,
        }
    }
}
