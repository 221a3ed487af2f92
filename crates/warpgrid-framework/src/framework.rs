//! Framework runner — builds a profile's plugins and drives scheduling cycles.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cycle_state::CycleState;
use crate::error::{FrameworkError, FrameworkResult};
use crate::handle::FrameworkHandle;
use crate::listers::SharedLister;
use crate::plugin::{FilterPlugin, NodeScore, PreFilterPlugin, PreScorePlugin, RegisteredPlugin, ScorePlugin};
use crate::profile::Profile;
use crate::registry::Registry;
use crate::status::Status;
use crate::types::{NodeInfo, Pod};

/// A node that failed filtering, with the plugin that rejected it.
#[derive(Debug, Clone, Serialize)]
pub struct NodeRejection {
    pub node: String,
    pub plugin: String,
    pub status: Status,
}

/// Outcome of one scheduling cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResult {
    pub pod: String,
    /// Feasible nodes, best first. Ties are broken by node name.
    pub ranked: Vec<NodeScore>,
    pub rejected: Vec<NodeRejection>,
    pub suggested_host: Option<String>,
}

struct WeightedScore {
    plugin: Arc<dyn ScorePlugin>,
    weight: i64,
}

/// The plugins of one profile, grouped by extension point.
pub struct Framework {
    profile_name: String,
    plugins: Vec<RegisteredPlugin>,
    pre_filter: Vec<Arc<dyn PreFilterPlugin>>,
    filter: Vec<Arc<dyn FilterPlugin>>,
    pre_score: Vec<Arc<dyn PreScorePlugin>>,
    score: Vec<WeightedScore>,
    lister: Option<Arc<dyn SharedLister>>,
}

impl Framework {
    /// Instantiate every plugin the profile enables, exactly once each.
    pub fn new(registry: &Registry, profile: &Profile, handle: &dyn FrameworkHandle) -> FrameworkResult<Self> {
        profile.validate()?;

        let mut fw = Framework {
            profile_name: profile.scheduler_name.clone(),
            plugins: Vec::with_capacity(profile.plugins.len()),
            pre_filter: Vec::new(),
            filter: Vec::new(),
            pre_score: Vec::new(),
            score: Vec::new(),
            lister: handle.snapshot_shared_lister(),
        };

        for entry in &profile.plugins {
            let factory = registry
                .get(&entry.name)
                .ok_or_else(|| FrameworkError::NotRegistered(entry.name.clone()))?;
            let args = entry.raw_args()?;
            let plugin = factory(args.as_ref(), handle).map_err(|source| FrameworkError::PluginInit {
                name: entry.name.clone(),
                source,
            })?;

            if let Some(p) = &plugin.pre_filter {
                fw.pre_filter.push(Arc::clone(p));
            }
            if let Some(p) = &plugin.filter {
                fw.filter.push(Arc::clone(p));
            }
            if let Some(p) = &plugin.pre_score {
                fw.pre_score.push(Arc::clone(p));
            }
            if let Some(p) = &plugin.score {
                fw.score.push(WeightedScore {
                    plugin: Arc::clone(p),
                    weight: entry.score_weight(),
                });
            }

            info!(
                profile = %fw.profile_name,
                plugin = %entry.name,
                extension_points = ?plugin.extension_points(),
                "plugin initialized"
            );
            fw.plugins.push(plugin);
        }

        Ok(fw)
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    /// Constructed plugins, in profile order.
    pub fn plugins(&self) -> &[RegisteredPlugin] {
        &self.plugins
    }

    /// Run one scheduling cycle for `pod` against the handle's snapshot.
    ///
    /// Cycle state is created here and dropped on return.
    pub fn run_cycle(&self, pod: &Pod) -> FrameworkResult<ScheduleResult> {
        let state = CycleState::new();
        let pod_key = format!("{}/{}", pod.namespace, pod.name);

        self.run_pre_filter_plugins(&state, pod)?;

        let nodes: Vec<Arc<NodeInfo>> = self
            .lister
            .as_ref()
            .map(|l| l.node_infos().list().to_vec())
            .unwrap_or_default();

        let mut feasible = Vec::new();
        let mut rejected = Vec::new();
        for node in &nodes {
            match self.run_filter_plugins(&state, pod, node) {
                None => feasible.push(Arc::clone(node)),
                Some(rejection) => {
                    debug!(pod = %pod_key, node = %node.name, plugin = %rejection.plugin, reason = %rejection.status, "node filtered out");
                    rejected.push(rejection);
                }
            }
        }

        if feasible.is_empty() {
            warn!(pod = %pod_key, nodes = nodes.len(), "no feasible nodes");
            return Ok(ScheduleResult {
                pod: pod_key,
                ranked: Vec::new(),
                rejected,
                suggested_host: None,
            });
        }

        self.run_pre_score_plugins(&state, pod, &feasible)?;
        let ranked = self.run_score_plugins(&state, pod, &feasible)?;
        let suggested_host = ranked.first().map(|s| s.name.clone());

        info!(
            pod = %pod_key,
            feasible = ranked.len(),
            rejected = rejected.len(),
            host = ?suggested_host,
            "scheduling cycle complete"
        );

        Ok(ScheduleResult {
            pod: pod_key,
            ranked,
            rejected,
            suggested_host,
        })
    }

    pub fn run_pre_filter_plugins(&self, state: &CycleState, pod: &Pod) -> FrameworkResult<()> {
        for pl in &self.pre_filter {
            let status = pl.pre_filter(state, pod);
            if !status.is_success() {
                return Err(FrameworkError::PreFilter {
                    plugin: pl.name().to_string(),
                    status,
                });
            }
        }
        Ok(())
    }

    /// Returns the first rejection, or `None` if every filter passed.
    pub fn run_filter_plugins(&self, state: &CycleState, pod: &Pod, node: &NodeInfo) -> Option<NodeRejection> {
        self.filter.iter().find_map(|pl| {
            let status = pl.filter(state, pod, node);
            (!status.is_success()).then(|| NodeRejection {
                node: node.name.clone(),
                plugin: pl.name().to_string(),
                status,
            })
        })
    }

    pub fn run_pre_score_plugins(&self, state: &CycleState, pod: &Pod, nodes: &[Arc<NodeInfo>]) -> FrameworkResult<()> {
        for pl in &self.pre_score {
            let status = pl.pre_score(state, pod, nodes);
            if !status.is_success() {
                return Err(FrameworkError::PreScore {
                    plugin: pl.name().to_string(),
                    status,
                });
            }
        }
        Ok(())
    }

    /// Score, normalize, weight, and sum; returns nodes best first.
    pub fn run_score_plugins(&self, state: &CycleState, pod: &Pod, nodes: &[Arc<NodeInfo>]) -> FrameworkResult<Vec<NodeScore>> {
        let mut totals: HashMap<&str, i64> = nodes.iter().map(|n| (n.name.as_str(), 0)).collect();

        for ws in &self.score {
            let mut scores = Vec::with_capacity(nodes.len());
            for node in nodes {
                let score = ws.plugin.score(state, pod, &node.name).map_err(|status| FrameworkError::Score {
                    plugin: ws.plugin.name().to_string(),
                    status,
                })?;
                scores.push(NodeScore {
                    name: node.name.clone(),
                    score,
                });
            }

            let status = ws.plugin.normalize_score(state, pod, &mut scores);
            if !status.is_success() {
                return Err(FrameworkError::Score {
                    plugin: ws.plugin.name().to_string(),
                    status,
                });
            }

            for s in &scores {
                if let Some(total) = totals.get_mut(s.name.as_str()) {
                    *total += s.score * ws.weight;
                }
            }
        }

        let mut ranked: Vec<NodeScore> = totals
            .into_iter()
            .map(|(name, score)| NodeScore {
                name: name.to_string(),
                score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        Ok(ranked)
    }
}
