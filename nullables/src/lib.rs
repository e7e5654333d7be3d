//! Nullable infrastructure for deterministic testing.
//!
//! The governance core reads two things from the outside world: the current
//! chain height and token balances. This crate provides in-memory versions of
//! both that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: hand these to the engine in tests and replays instead of a real
//! chain tip and token ledger.

pub mod balances;
pub mod clock;

pub use balances::NullBalances;
pub use clock::NullClock;
