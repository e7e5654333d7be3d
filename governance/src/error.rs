use daocore_types::{Principal, ProposalId, TokenAmount};
use thiserror::Error;

/// Every way a governance operation can be rejected.
///
/// Each kind has a stable numeric code (see [`GovernanceError::code`]). A failed
/// operation never leaves partial state behind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error("caller {0} is not the governance administrator")]
    NotAuthorized(Principal),

    #[error("a proposal titled {0:?} already exists")]
    ProposalAlreadyExists(String),

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("voting window for proposal {0} is closed")]
    VotingClosed(ProposalId),

    #[error("{voter} has already voted on proposal {proposal}")]
    AlreadyVoted { proposal: ProposalId, voter: Principal },

    #[error("quorum not reached: {yes} yes votes < {required} required")]
    QuorumNotReached { yes: TokenAmount, required: TokenAmount },

    #[error("proposal duration {0} is outside [1, 10080] blocks")]
    InvalidProposalDuration(u64),

    #[error("quorum threshold {0}% is outside [1, 100]")]
    InvalidQuorumThreshold(u32),

    #[error("unknown proposal type {0:?}")]
    InvalidProposalType(String),

    /// Raised for both an invalid title and an invalid description.
    #[error("invalid {0}: must be non-empty and within the length limit")]
    InvalidDescription(&'static str),

    /// Reserved; no operation currently produces it.
    #[error("invalid vote")]
    InvalidVote,

    #[error("{0} holds no governance tokens")]
    NotTokenHolder(Principal),

    /// Reserved; always shadowed by `NotTokenHolder`.
    #[error("insufficient token balance")]
    InsufficientBalance,

    #[error("proposal {0} has already been executed")]
    ProposalExecuted(ProposalId),

    #[error("no executor is configured")]
    AuthorityNotSet,

    /// A height computation (window end, clock advance) would pass `u64::MAX`.
    #[error("block height overflow")]
    InvalidTimestamp,

    #[error("proposal limit of {0} reached")]
    MaxProposalsExceeded(u64),

    #[error("rule change text exceeds 200 characters")]
    InvalidRuleChange,

    #[error("reward amount must be positive")]
    InvalidRewardAmount,

    #[error("zone name exceeds 50 characters")]
    InvalidZone,

    /// Reserved; no operation currently produces it.
    #[error("invalid proposal status")]
    InvalidStatus,
}

impl GovernanceError {
    /// Stable numeric code, independent of the error payload.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized(_) => 100,
            Self::ProposalAlreadyExists(_) => 101,
            Self::ProposalNotFound(_) => 102,
            Self::VotingClosed(_) => 103,
            Self::AlreadyVoted { .. } => 104,
            Self::QuorumNotReached { .. } => 105,
            Self::InvalidProposalDuration(_) => 106,
            Self::InvalidQuorumThreshold(_) => 107,
            Self::InvalidProposalType(_) => 108,
            Self::InvalidDescription(_) => 109,
            Self::InvalidVote => 110,
            Self::NotTokenHolder(_) => 111,
            Self::InsufficientBalance => 112,
            Self::ProposalExecuted(_) => 113,
            Self::AuthorityNotSet => 114,
            Self::InvalidTimestamp => 115,
            Self::MaxProposalsExceeded(_) => 116,
            Self::InvalidRuleChange => 117,
            Self::InvalidRewardAmount => 118,
            Self::InvalidZone => 119,
            Self::InvalidStatus => 120,
        }
    }

    /// Stable kind name, e.g. `"QuorumNotReached"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthorized(_) => "NotAuthorized",
            Self::ProposalAlreadyExists(_) => "ProposalAlreadyExists",
            Self::ProposalNotFound(_) => "ProposalNotFound",
            Self::VotingClosed(_) => "VotingClosed",
            Self::AlreadyVoted { .. } => "AlreadyVoted",
            Self::QuorumNotReached { .. } => "QuorumNotReached",
            Self::InvalidProposalDuration(_) => "InvalidProposalDuration",
            Self::InvalidQuorumThreshold(_) => "InvalidQuorumThreshold",
            Self::InvalidProposalType(_) => "InvalidProposalType",
            Self::InvalidDescription(_) => "InvalidDescription",
            Self::InvalidVote => "InvalidVote",
            Self::NotTokenHolder(_) => "NotTokenHolder",
            Self::InsufficientBalance => "InsufficientBalance",
            Self::ProposalExecuted(_) => "ProposalExecuted",
            Self::AuthorityNotSet => "AuthorityNotSet",
            Self::InvalidTimestamp => "InvalidTimestamp",
            Self::MaxProposalsExceeded(_) => "MaxProposalsExceeded",
            Self::InvalidRuleChange => "InvalidRuleChange",
            Self::InvalidRewardAmount => "InvalidRewardAmount",
            Self::InvalidZone => "InvalidZone",
            Self::InvalidStatus => "InvalidStatus",
        }
    }
}

/// Failure to load or validate a [`GovernanceConfig`](crate::GovernanceConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(#[from] GovernanceError),

    #[error("invalid principal for {field}: {value:?}")]
    InvalidPrincipal { field: &'static str, value: String },
}

/// Failure to encode or restore a store snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot is corrupted: {0}")]
    Corruption(String),
}
