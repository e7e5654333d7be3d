//! Nullable balances: a thread-safe in-memory token ledger for testing.

use daocore_types::{BalanceSource, Principal, TokenAmount};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory balance table. Unknown holders have a zero balance.
///
/// Balances can be changed while an engine holds an `Arc` to the table, which
/// is how tests model transfers between votes.
pub struct NullBalances {
    balances: Mutex<HashMap<Principal, TokenAmount>>,
}

impl NullBalances {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// Builder-style initial balance.
    pub fn with_balance(self, holder: impl Into<Principal>, amount: u128) -> Self {
        self.set_balance(holder, amount);
        self
    }

    /// Set a holder's balance.
    pub fn set_balance(&self, holder: impl Into<Principal>, amount: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert(holder.into(), TokenAmount::new(amount));
    }
}

impl Default for NullBalances {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceSource for NullBalances {
    fn balance_of(&self, holder: &Principal) -> TokenAmount {
        self.balances
            .lock()
            .unwrap()
            .get(holder)
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }
}
