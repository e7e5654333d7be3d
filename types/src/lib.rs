//! Fundamental types for daocore.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! principal identities, block heights, token amounts, proposal ids, and the
//! collaborator traits (balance lookup and height clock) the governance core consumes.

pub mod amount;
pub mod height;
pub mod id;
pub mod principal;
pub mod source;

pub use amount::TokenAmount;
pub use height::BlockHeight;
pub use id::ProposalId;
pub use principal::Principal;
pub use source::{BalanceSource, HeightClock};
