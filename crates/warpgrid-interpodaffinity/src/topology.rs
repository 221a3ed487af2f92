//! Counters keyed by topology domain: `(topology key, node label value)`.

use std::collections::HashMap;

use warpgrid_framework::NodeInfo;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TopologyMap {
    inner: HashMap<String, HashMap<String, i64>>,
}

impl TopologyMap {
    /// Add `delta` to the domain `node` belongs to for `key`. Nodes without
    /// the label are not in any domain and are skipped.
    pub(crate) fn add(&mut self, key: &str, node: &NodeInfo, delta: i64) {
        if delta == 0 {
            return;
        }
        if let Some(value) = node.topology_value(key) {
            *self
                .inner
                .entry(key.to_string())
                .or_default()
                .entry(value.to_string())
                .or_default() += delta;
        }
    }

    pub(crate) fn get(&self, key: &str, value: &str) -> i64 {
        self.inner
            .get(key)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of every domain the node's labels place it in.
    pub(crate) fn sum_for(&self, node: &NodeInfo) -> i64 {
        node.labels.iter().map(|(k, v)| self.get(k, v)).sum()
    }

    /// True if any of the node's label pairs has a positive count.
    pub(crate) fn any_positive_for(&self, node: &NodeInfo) -> bool {
        node.labels.iter().any(|(k, v)| self.get(k, v) > 0)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
