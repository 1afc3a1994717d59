//! Configuration for the indexing core
//!
//! Two layers, matching how the rest of this crate splits configuration:
//! construction-time directory defaults, and per-insert options that can
//! vary call to call (e.g. a caller tuning AVL rebalancing for a bulk load).

use serde::{Deserialize, Serialize};

/// Construction-time defaults for an [`crate::directory::IndexDirectory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Default AVL rebalance threshold used when an insert does not supply
    /// its own [`InsertOptions::avl_rebalance_threshold`].
    pub default_avl_rebalance_threshold: u32,

    /// Default per-property boost used by [`crate::query::Planner::search`]
    /// when the caller's boost map omits a requested property.
    pub default_boost: f32,

    /// BKD overflow-leaf buffer size before a subtree rebuild is triggered.
    pub bkd_overflow_threshold: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_avl_rebalance_threshold: 1,
            default_boost: 1.0,
            bkd_overflow_threshold: 64,
        }
    }
}

impl DirectoryConfig {
    pub fn with_avl_rebalance_threshold(mut self, t: u32) -> Self {
        self.default_avl_rebalance_threshold = t;
        self
    }

    pub fn with_bkd_overflow_threshold(mut self, n: usize) -> Self {
        self.bkd_overflow_threshold = n;
        self
    }
}

/// Per-insert options (§6 of the spec: "Insert options (enumerated)").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InsertOptions {
    /// AVL height-skew tolerance `t`: a node rebalances when
    /// `|height(left) - height(right)| > t` after an insert. Higher values
    /// trade query sharpness for insert throughput. `None` defers to the
    /// directory's [`DirectoryConfig::default_avl_rebalance_threshold`].
    pub avl_rebalance_threshold: Option<u32>,
}

impl InsertOptions {
    pub fn with_avl_rebalance_threshold(mut self, t: u32) -> Self {
        self.avl_rebalance_threshold = Some(t);
        self
    }

    pub(crate) fn resolve_avl_threshold(&self, config: &DirectoryConfig) -> u32 {
        self.avl_rebalance_threshold
            .unwrap_or(config.default_avl_rebalance_threshold)
    }
}
