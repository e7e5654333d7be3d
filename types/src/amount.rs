//! Token amounts and vote weights.
//!
//! Amounts are raw integer units (u128). Vote tallies are sums of holder
//! balances, so they share the same type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A governance-token amount in raw units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// `floor(self * percent / 100)` without overflowing the intermediate product.
    ///
    /// Splitting `self = 100q + r` gives `q * percent + floor(r * percent / 100)`,
    /// which is exact for every `percent` up to `u32::MAX`.
    pub fn percent(self, percent: u32) -> Self {
        let pct = u128::from(percent);
        let whole = (self.0 / 100).saturating_mul(pct);
        let rest = (self.0 % 100) * pct / 100;
        Self(whole.saturating_add(rest))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for TokenAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}
