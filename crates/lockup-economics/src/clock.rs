// crates/lockup-economics/src/clock.rs

use std::sync::atomic::{AtomicU64, Ordering};

use lockup_core::{Clock, TimeIndex};

/// Block height set explicitly by the host, a test, or the CLI.
#[derive(Debug, Default)]
pub struct ManualClock {
    block: AtomicU64,
}

impl ManualClock {
    pub fn new(block: TimeIndex) -> Self {
        Self {
            block: AtomicU64::new(block),
        }
    }

    pub fn set(&self, block: TimeIndex) {
        self.block.store(block, Ordering::SeqCst);
    }

    /// Move the clock forward by `blocks`.
    pub fn advance(&self, blocks: TimeIndex) {
        self.block.fetch_add(blocks, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeIndex {
        self.block.load(Ordering::SeqCst)
    }
}
