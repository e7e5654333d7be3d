//! Collaborator traits: the governance core reads balances and heights, never owns them.
//!
//! Real deployments back these with a token ledger and a chain tip; tests use the
//! implementations in `daocore-nullables`.

use crate::{BlockHeight, Principal, TokenAmount};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Token balance lookup.
///
/// Must be deterministic for a given height so that tallies are reproducible.
pub trait BalanceSource {
    /// Current balance of `holder`; unknown holders have a zero balance.
    fn balance_of(&self, holder: &Principal) -> TokenAmount;
}

/// Current chain height.
pub trait HeightClock {
    fn current_height(&self) -> BlockHeight;
}

impl<T: BalanceSource + ?Sized> BalanceSource for &T {
    fn balance_of(&self, holder: &Principal) -> TokenAmount {
        (**self).balance_of(holder)
    }
}

impl<T: BalanceSource + ?Sized> BalanceSource for Arc<T> {
    fn balance_of(&self, holder: &Principal) -> TokenAmount {
        (**self).balance_of(holder)
    }
}

impl BalanceSource for HashMap<Principal, TokenAmount> {
    fn balance_of(&self, holder: &Principal) -> TokenAmount {
        self.get(holder).copied().unwrap_or(TokenAmount::ZERO)
    }
}

impl BalanceSource for BTreeMap<Principal, TokenAmount> {
    fn balance_of(&self, holder: &Principal) -> TokenAmount {
        self.get(holder).copied().unwrap_or(TokenAmount::ZERO)
    }
}
