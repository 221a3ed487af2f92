//! Pre-score and score: preferred terms and symmetric hard affinity.
//!
//! Pre-score folds every relevant existing pod into one map of topology
//! domain → score. A node's score is the sum over the domains its labels
//! put it in; normalization then rescales the feasible nodes onto
//! `0..=MAX_NODE_SCORE`.

use std::sync::Arc;

use tracing::debug;
use warpgrid_framework::{
    CycleState, MAX_NODE_SCORE, MIN_NODE_SCORE, NodeInfo, NodeScore, Pod, PreScorePlugin, ScorePlugin, Status,
    WeightedPodAffinityTerm,
};

use crate::plugin::InterPodAffinity;
use crate::topology::TopologyMap;

/// Cycle state key for the pre-score result.
pub const PRE_SCORE_STATE_KEY: &str = "PreScoreInterPodAffinity";

#[derive(Debug, Default)]
pub(crate) struct PreScoreState {
    topology_score: TopologyMap,
}

impl InterPodAffinity {
    /// Add the contribution of `existing`, running on `node`, to `scores`.
    fn process_existing_pod(&self, scores: &mut TopologyMap, pod: &Pod, existing: &Pod, node: &NodeInfo) {
        // Incoming pod's soft preferences towards / away from `existing`.
        add_weighted_terms(scores, pod.preferred_affinity_terms(), pod, existing, node, 1);
        add_weighted_terms(scores, pod.preferred_anti_affinity_terms(), pod, existing, node, -1);

        // `existing`'s constraints towards the incoming pod.
        if self.hard_pod_affinity_weight > 0 {
            for term in existing.required_affinity_terms() {
                if term.matches(existing, pod) {
                    scores.add(&term.topology_key, node, i64::from(self.hard_pod_affinity_weight));
                }
            }
        }
        add_weighted_terms(scores, existing.preferred_affinity_terms(), existing, pod, node, 1);
        add_weighted_terms(scores, existing.preferred_anti_affinity_terms(), existing, pod, node, -1);
    }
}

fn add_weighted_terms(
    scores: &mut TopologyMap,
    terms: &[WeightedPodAffinityTerm],
    owner: &Pod,
    target: &Pod,
    node: &NodeInfo,
    sign: i64,
) {
    for wt in terms {
        if wt.pod_affinity_term.matches(owner, target) {
            scores.add(&wt.pod_affinity_term.topology_key, node, sign * i64::from(wt.weight));
        }
    }
}

impl PreScorePlugin for InterPodAffinity {
    fn pre_score(&self, state: &CycleState, pod: &Pod, nodes: &[Arc<NodeInfo>]) -> Status {
        if nodes.is_empty() {
            return Status::success();
        }

        let has_constraints = pod.has_affinity_constraints();
        let mut topology_score = TopologyMap::default();

        // Existing pods anywhere in the cluster count, not only those on
        // the feasible nodes.
        for node in self.shared_lister.node_infos().list() {
            for existing in &node.pods {
                if !has_constraints && !existing.has_affinity_constraints() {
                    continue;
                }
                self.process_existing_pod(&mut topology_score, pod, existing, node);
            }
        }

        debug!(pod = %pod.name, feasible = nodes.len(), "InterPodAffinity pre-score computed");
        state.write(PRE_SCORE_STATE_KEY, PreScoreState { topology_score });
        Status::success()
    }
}

impl ScorePlugin for InterPodAffinity {
    fn score(&self, state: &CycleState, _pod: &Pod, node_name: &str) -> Result<i64, Status> {
        let node = self
            .shared_lister
            .node_infos()
            .get(node_name)
            .map_err(|e| Status::error(format!("getting node {node_name:?} from snapshot: {e}")))?;
        let computed = state
            .read::<PreScoreState>(PRE_SCORE_STATE_KEY)
            .map_err(|e| Status::error(e.to_string()))?;
        Ok(computed.topology_score.sum_for(&node))
    }

    /// Rescale onto `MIN_NODE_SCORE..=MAX_NODE_SCORE` using the range
    /// spanned by the raw scores and zero.
    fn normalize_score(&self, state: &CycleState, _pod: &Pod, scores: &mut [NodeScore]) -> Status {
        let computed = match state.read::<PreScoreState>(PRE_SCORE_STATE_KEY) {
            Ok(s) => s,
            Err(e) => return Status::error(e.to_string()),
        };
        if computed.topology_score.is_empty() {
            return Status::success();
        }

        let max = scores.iter().map(|s| s.score).fold(0, i64::max);
        let min = scores.iter().map(|s| s.score).fold(0, i64::min);
        let diff = max - min;
        for s in scores.iter_mut() {
            s.score = if diff > 0 {
                MIN_NODE_SCORE + (MAX_NODE_SCORE - MIN_NODE_SCORE) * (s.score - min) / diff
            } else {
                MIN_NODE_SCORE
            };
        }
        Status::success()
    }
}
