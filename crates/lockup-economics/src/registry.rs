// crates/lockup-economics/src/registry.rs

use std::collections::HashSet;

use lockup_core::{Address, PoolRegistry};

/// Fixed set of registered pools.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    pools: HashSet<Address>,
}

impl StaticRegistry {
    pub fn new<I: IntoIterator<Item = Address>>(pools: I) -> Self {
        Self {
            pools: pools.into_iter().collect(),
        }
    }

    /// Number of distinct registered pools.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl PoolRegistry for StaticRegistry {
    fn is_registered_pool(&self, pool: &Address) -> bool {
        self.pools.contains(pool)
    }
}
