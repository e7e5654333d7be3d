//! Settable chain tip for tests and script replay.

use daocore_types::{BlockHeight, HeightClock};
use std::cell::Cell;

/// A chain tip that moves only when told to.
///
/// Heights never wrap: an advance past `u64::MAX` is refused and the tip stays
/// where it was.
pub struct NullClock {
    tip: Cell<BlockHeight>,
}

impl NullClock {
    pub fn new(height: u64) -> Self {
        Self {
            tip: Cell::new(BlockHeight::new(height)),
        }
    }

    /// Move the tip forward by `blocks` and return the new height, or `None`
    /// (tip unchanged) if that would overflow.
    pub fn advance(&self, blocks: u64) -> Option<BlockHeight> {
        let next = self.tip.get().checked_add(blocks)?;
        self.tip.set(next);
        Some(next)
    }

    /// Jump to `height`, forwards or backwards.
    pub fn set(&self, height: u64) {
        self.tip.set(BlockHeight::new(height));
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HeightClock for NullClock {
    fn current_height(&self) -> BlockHeight {
        self.tip.get()
    }
}
