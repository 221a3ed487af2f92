//! Extension-point traits implemented by scheduling plugins.
//!
//! Each extension point is its own trait so a plugin only implements the
//! roles it fills. A plugin instance is constructed once and then invoked
//! for every cycle, possibly from several threads at once, hence the
//! `Send + Sync` bound on [`Plugin`]. Anything a plugin computes for a
//! single pod belongs in the [`CycleState`], not on `self`.

use std::sync::Arc;

use serde::Serialize;

use crate::cycle_state::CycleState;
use crate::status::Status;
use crate::types::{NodeInfo, Pod};

/// Highest score a node can get after normalization.
pub const MAX_NODE_SCORE: i64 = 100;
/// Lowest score a node can get after normalization.
pub const MIN_NODE_SCORE: i64 = 0;

/// Common identity of every plugin.
pub trait Plugin: Send + Sync {
    /// Stable plugin name, used for registry lookup, profile config and logs.
    fn name(&self) -> &str;
}

/// Runs once per cycle before any node is filtered.
pub trait PreFilterPlugin: Plugin {
    fn pre_filter(&self, state: &CycleState, pod: &Pod) -> Status;
}

/// Runs once per candidate node; a non-success status rejects the node.
pub trait FilterPlugin: Plugin {
    fn filter(&self, state: &CycleState, pod: &Pod, node: &NodeInfo) -> Status;
}

/// Runs once per cycle after filtering, with the nodes that passed.
pub trait PreScorePlugin: Plugin {
    fn pre_score(&self, state: &CycleState, pod: &Pod, nodes: &[Arc<NodeInfo>]) -> Status;
}

/// Runs once per feasible node and ranks it.
pub trait ScorePlugin: Plugin {
    fn score(&self, state: &CycleState, pod: &Pod, node_name: &str) -> Result<i64, Status>;

    /// Rescale raw scores into `MIN_NODE_SCORE..=MAX_NODE_SCORE`.
    /// The default leaves scores untouched.
    fn normalize_score(&self, _state: &CycleState, _pod: &Pod, _scores: &mut [NodeScore]) -> Status {
        Status::success()
    }
}

/// Score of one node from one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeScore {
    pub name: String,
    pub score: i64,
}

/// A constructed plugin split into the extension points it serves.
///
/// The same `Arc` is shared by every slot it fills.
#[derive(Clone)]
pub struct RegisteredPlugin {
    name: String,
    pub(crate) pre_filter: Option<Arc<dyn PreFilterPlugin>>,
    pub(crate) filter: Option<Arc<dyn FilterPlugin>>,
    pub(crate) pre_score: Option<Arc<dyn PreScorePlugin>>,
    pub(crate) score: Option<Arc<dyn ScorePlugin>>,
}

impl RegisteredPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pre_filter: None,
            filter: None,
            pre_score: None,
            score: None,
        }
    }

    pub fn with_pre_filter(mut self, plugin: Arc<dyn PreFilterPlugin>) -> Self {
        self.pre_filter = Some(plugin);
        self
    }

    pub fn with_filter(mut self, plugin: Arc<dyn FilterPlugin>) -> Self {
        self.filter = Some(plugin);
        self
    }

    pub fn with_pre_score(mut self, plugin: Arc<dyn PreScorePlugin>) -> Self {
        self.pre_score = Some(plugin);
        self
    }

    pub fn with_score(mut self, plugin: Arc<dyn ScorePlugin>) -> Self {
        self.score = Some(plugin);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the extension points this plugin serves, in cycle order.
    pub fn extension_points(&self) -> Vec<&'static str> {
        let mut points = Vec::new();
        if self.pre_filter.is_some() {
            points.push("PreFilter");
        }
        if self.filter.is_some() {
            points.push("Filter");
        }
        if self.pre_score.is_some() {
            points.push("PreScore");
        }
        if self.score.is_some() {
            points.push("Score");
        }
        points
    }
}

impl std::fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("name", &self.name)
            .field("extension_points", &self.extension_points())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Plugin for Noop {
        fn name(&self) -> &str {
            "Noop"
        }
    }

    impl FilterPlugin for Noop {
        fn filter(&self, _: &CycleState, _: &Pod, _: &NodeInfo) -> Status {
            Status::success()
        }
    }

    impl ScorePlugin for Noop {
        fn score(&self, _: &CycleState, _: &Pod, _: &str) -> Result<i64, Status> {
            Ok(0)
        }
    }

    #[test]
    fn extension_points_follow_slots() {
        let noop = Arc::new(Noop);
        let registered = RegisteredPlugin::new("Noop")
            .with_filter(noop.clone())
            .with_score(noop);
        assert_eq!(registered.extension_points(), vec!["Filter", "Score"]);
    }

    #[test]
    fn default_normalize_is_identity() {
        let mut scores = vec![NodeScore {
            name: "n1".to_string(),
            score: 250,
        }];
        let status = Noop.normalize_score(&CycleState::new(), &Pod::default(), &mut scores);
        assert!(status.is_success());
        assert_eq!(scores[0].score, 250);
    }
}
