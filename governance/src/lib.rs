//! Token-weighted governance for daocore.
//!
//! Lifecycle: Create → Vote (through `end_height`) → Execute (after `end_height`).
//! Votes are weighted by the voter's token balance at the time of voting, each
//! holder votes once per proposal, and a proposal executes at most once when its
//! yes votes reach the quorum percentage of total turnout and an executor is set.
//!
//! The engine never interprets what a proposal does. It marks it executed and
//! leaves the substantive action to the configured executor.

pub mod config;
pub mod engine;
pub mod error;
pub mod proposal;
pub mod shared;
pub mod store;

pub use config::GovernanceConfig;
pub use engine::GovernanceEngine;
pub use error::{ConfigError, GovernanceError, StoreError};
pub use proposal::{Proposal, ProposalRequest, ProposalStatus, ProposalType, Tally};
pub use shared::SharedGovernance;
pub use store::GovernanceStore;
