//! Read-only access to the cluster snapshot.
//!
//! A `Snapshot` is taken once per scheduling cycle by the host and shared
//! (behind an `Arc`) with every plugin. Nothing in a plugin may mutate it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FrameworkError, FrameworkResult};
use crate::types::NodeInfo;

/// Lists node infos from a snapshot.
pub trait NodeInfoLister {
    /// All nodes, in snapshot order.
    fn list(&self) -> &[Arc<NodeInfo>];

    /// A single node by name.
    fn get(&self, node_name: &str) -> FrameworkResult<Arc<NodeInfo>>;
}

/// The shared lister handed to plugins through the framework handle.
pub trait SharedLister: Send + Sync {
    fn node_infos(&self) -> &dyn NodeInfoLister;
}

/// Immutable point-in-time view of the cluster.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    nodes: Vec<Arc<NodeInfo>>,
    by_name: HashMap<String, usize>,
}

impl Snapshot {
    pub fn new(nodes: Vec<NodeInfo>) -> Self {
        let nodes: Vec<Arc<NodeInfo>> = nodes.into_iter().map(Arc::new).collect();
        let by_name = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
        Self { nodes, by_name }
    }

    /// Parse a JSON array of nodes.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        Ok(Self::new(file.nodes))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// On-disk snapshot layout: `{"nodes": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    nodes: Vec<NodeInfo>,
}

impl NodeInfoLister for Snapshot {
    fn list(&self) -> &[Arc<NodeInfo>] {
        &self.nodes
    }

    fn get(&self, node_name: &str) -> FrameworkResult<Arc<NodeInfo>> {
        self.by_name
            .get(node_name)
            .map(|&i| Arc::clone(&self.nodes[i]))
            .ok_or_else(|| FrameworkError::NodeNotFound(node_name.to_string()))
    }
}

impl SharedLister for Snapshot {
    fn node_infos(&self) -> &dyn NodeInfoLister {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_by_name() {
        let snap = Snapshot::new(vec![NodeInfo::new("n1"), NodeInfo::new("n2")]);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.node_infos().get("n2").unwrap().name, "n2");
        assert_eq!(snap.node_infos().list()[0].name, "n1");
    }

    #[test]
    fn unknown_node_is_an_error() {
        let snap = Snapshot::default();
        assert!(snap.is_empty());
        let err = snap.node_infos().get("ghost").unwrap_err();
        assert!(matches!(err, FrameworkError::NodeNotFound(ref n) if n == "ghost"));
    }

    #[test]
    fn parses_json_file_layout() {
        let json = r#"{"nodes": [
            {"name": "n1", "labels": {"zone": "a"}},
            {"name": "n2", "labels": {"zone": "b"}, "pods": [{"name": "db-0", "labels": {"app": "db"}}]}
        ]}"#;
        let snap = Snapshot::from_json(json).unwrap();
        let n2 = snap.node_infos().get("n2").unwrap();
        assert_eq!(n2.topology_value("zone"), Some("b"));
        assert_eq!(n2.pods.len(), 1);
        assert_eq!(n2.pods[0].namespace, "default");
    }
}
