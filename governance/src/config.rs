//! Governance configuration with TOML file support.
//!
//! The configuration is owned by the [`GovernanceStore`](crate::GovernanceStore)
//! and, after construction, only changes through the admin operations of
//! [`GovernanceEngine`](crate::GovernanceEngine).

use std::path::Path;

use daocore_types::Principal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GovernanceError};

pub const MIN_PROPOSAL_DURATION: u64 = 1;
pub const MAX_PROPOSAL_DURATION: u64 = 10_080;
pub const MIN_QUORUM_THRESHOLD: u32 = 1;
pub const MAX_QUORUM_THRESHOLD: u32 = 100;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_RULE_CHANGE_LEN: usize = 200;
pub const MAX_ZONE_LEN: usize = 50;

pub const DEFAULT_PROPOSAL_DURATION: u64 = 144;
pub const DEFAULT_QUORUM_THRESHOLD: u32 = 51;
pub const DEFAULT_MAX_PROPOSALS: u64 = 1000;
pub const DEFAULT_GOVERNANCE_TOKEN: &str = "SP000000000000000000002Q6VF78";

/// Process-wide governance settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// The only principal allowed to change settings.
    pub admin: Principal,

    /// Length of the voting window in blocks, `[1, 10080]`.
    #[serde(default = "default_proposal_duration")]
    pub proposal_duration: u64,

    /// Percent of turnout that yes votes must reach, `[1, 100]`.
    #[serde(default = "default_quorum_threshold")]
    pub quorum_threshold: u32,

    /// Hard cap on the number of proposals ever created.
    #[serde(default = "default_max_proposals")]
    pub max_proposals: u64,

    /// Token whose balances weight the votes. Stored for reference only.
    #[serde(default = "default_governance_token")]
    pub governance_token: Principal,

    /// Collaborator that carries out executed proposals. Must be set before
    /// any proposal can be executed.
    #[serde(default)]
    pub executor: Option<Principal>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_proposal_duration() -> u64 {
    DEFAULT_PROPOSAL_DURATION
}

fn default_quorum_threshold() -> u32 {
    DEFAULT_QUORUM_THRESHOLD
}

fn default_max_proposals() -> u64 {
    DEFAULT_MAX_PROPOSALS
}

fn default_governance_token() -> Principal {
    Principal::new(DEFAULT_GOVERNANCE_TOKEN)
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    /// Default settings administered by `admin`.
    pub fn new(admin: impl Into<Principal>) -> Self {
        Self {
            admin: admin.into(),
            proposal_duration: default_proposal_duration(),
            quorum_threshold: default_quorum_threshold(),
            max_proposals: default_max_proposals(),
            governance_token: default_governance_token(),
            executor: None,
        }
    }

    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check_principals()?;
        config.validate()?;
        Ok(config)
    }

    fn check_principals(&self) -> Result<(), ConfigError> {
        let named = [
            ("admin", Some(&self.admin)),
            ("governance_token", Some(&self.governance_token)),
            ("executor", self.executor.as_ref()),
        ];
        for (field, principal) in named {
            if let Some(principal) = principal.filter(|p| !p.is_valid()) {
                return Err(ConfigError::InvalidPrincipal {
                    field,
                    value: principal.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Check the duration and quorum bounds.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        validate_proposal_duration(self.proposal_duration)?;
        validate_quorum_threshold(self.quorum_threshold)
    }
}

pub fn validate_proposal_duration(blocks: u64) -> Result<(), GovernanceError> {
    if (MIN_PROPOSAL_DURATION..=MAX_PROPOSAL_DURATION).contains(&blocks) {
        Ok(())
    } else {
        Err(GovernanceError::InvalidProposalDuration(blocks))
    }
}

pub fn validate_quorum_threshold(percent: u32) -> Result<(), GovernanceError> {
    if (MIN_QUORUM_THRESHOLD..=MAX_QUORUM_THRESHOLD).contains(&percent) {
        Ok(())
    } else {
        Err(GovernanceError::InvalidQuorumThreshold(percent))
    }
}
