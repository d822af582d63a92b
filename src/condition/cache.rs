//! Parsed condition cache - keyed by the raw condition string

use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

use crate::condition::node::ConditionNode;
use crate::condition::parse_to_logic_tree;
use crate::error::Result;

/// Memo of normalized logic trees
///
/// Owned by the caller and safe to share between threads; there is no global
/// instance. Failed parses are never stored.
#[derive(Debug, Default)]
pub struct ConditionCache {
    trees: RwLock<AHashMap<String, Arc<ConditionNode>>>,
}

impl ConditionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trees: RwLock::new(AHashMap::with_capacity(capacity)),
        }
    }

    /// Get or parse a condition string, reusing the tree for repeated conditions
    #[inline]
    pub fn get_or_parse(&self, condition: &str) -> Result<Arc<ConditionNode>> {
        // Fast path: check read lock first
        {
            let trees = self.trees.read();
            if let Some(tree) = trees.get(condition) {
                trace!(condition, "condition cache hit");
                return Ok(Arc::clone(tree));
            }
        }

        // Slow path: parse and cache
        trace!(condition, "condition cache miss");
        let tree = Arc::new(parse_to_logic_tree(condition)?);

        let mut trees = self.trees.write();
        // another thread may have raced us here; keep whichever tree landed first
        let cached = trees.entry(condition.to_string()).or_insert(tree);
        Ok(Arc::clone(cached))
    }

    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }

    pub fn clear(&self) {
        self.trees.write().clear();
    }
}
