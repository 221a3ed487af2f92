//! Pre-filter and filter: required affinity and anti-affinity.
//!
//! Pre-filter walks the snapshot once per cycle and counts, per topology
//! domain, the existing pods relevant to the incoming pod. Filter then
//! answers each node with a few map lookups.

use std::sync::Arc;

use tracing::debug;
use warpgrid_framework::{Code, CycleState, FilterPlugin, NodeInfo, Pod, PreFilterPlugin, Status};

use crate::plugin::InterPodAffinity;
use crate::topology::TopologyMap;

/// Cycle state key for the pre-filter result.
pub const PRE_FILTER_STATE_KEY: &str = "PreFilterInterPodAffinity";

pub const ERR_REASON_AFFINITY_NOT_MATCH: &str = "node(s) didn't match pod affinity/anti-affinity";
pub const ERR_REASON_EXISTING_ANTI_AFFINITY_RULES_NOT_MATCH: &str =
    "node(s) didn't satisfy existing pods anti-affinity rules";
pub const ERR_REASON_AFFINITY_RULES_NOT_MATCH: &str = "node(s) didn't match pod affinity rules";
pub const ERR_REASON_ANTI_AFFINITY_RULES_NOT_MATCH: &str =
    "node(s) didn't match pod anti-affinity rules";

/// Computed in pre-filter, read by filter.
#[derive(Debug, Default)]
pub(crate) struct PreFilterState {
    /// Domains holding an existing pod whose required anti-affinity selects
    /// the incoming pod.
    existing_anti_affinity: TopologyMap,
    /// Existing pods matching all of the incoming pod's required affinity terms.
    affinity: TopologyMap,
    /// Existing pods matching one of the incoming pod's required anti-affinity terms.
    anti_affinity: TopologyMap,
}

impl PreFilterState {
    fn compute(pod: &Pod, nodes: &[Arc<NodeInfo>]) -> Self {
        let affinity_terms = pod.required_affinity_terms();
        let anti_affinity_terms = pod.required_anti_affinity_terms();
        let mut state = Self::default();

        for node in nodes {
            for existing in &node.pods {
                for term in existing.required_anti_affinity_terms() {
                    if term.matches(existing, pod) {
                        state.existing_anti_affinity.add(&term.topology_key, node, 1);
                    }
                }

                if !affinity_terms.is_empty() && affinity_terms.iter().all(|t| t.matches(pod, existing)) {
                    for term in affinity_terms {
                        state.affinity.add(&term.topology_key, node, 1);
                    }
                }

                for term in anti_affinity_terms {
                    if term.matches(pod, existing) {
                        state.anti_affinity.add(&term.topology_key, node, 1);
                    }
                }
            }
        }
        state
    }

    fn satisfies_existing_pods_anti_affinity(&self, node: &NodeInfo) -> bool {
        self.existing_anti_affinity.is_empty() || !self.existing_anti_affinity.any_positive_for(node)
    }

    fn satisfies_pod_anti_affinity(&self, pod: &Pod, node: &NodeInfo) -> bool {
        pod.required_anti_affinity_terms().iter().all(|term| {
            node.topology_value(&term.topology_key)
                .is_none_or(|value| self.anti_affinity.get(&term.topology_key, value) <= 0)
        })
    }

    fn satisfies_pod_affinity(&self, pod: &Pod, node: &NodeInfo) -> bool {
        let terms = pod.required_affinity_terms();
        let mut pods_exist = true;
        for term in terms {
            // Every topology key must be present on the node.
            let Some(value) = node.topology_value(&term.topology_key) else {
                return false;
            };
            if self.affinity.get(&term.topology_key, value) <= 0 {
                pods_exist = false;
            }
        }
        if pods_exist {
            return true;
        }
        // The first pod of a group with affinity to itself has nobody to
        // co-locate with; let it through if nothing else matches and it
        // matches its own terms.
        self.affinity.is_empty() && terms.iter().all(|t| t.matches(pod, pod))
    }
}

impl PreFilterPlugin for InterPodAffinity {
    fn pre_filter(&self, state: &CycleState, pod: &Pod) -> Status {
        let nodes = self.shared_lister.node_infos().list();
        let computed = PreFilterState::compute(pod, nodes);
        debug!(
            pod = %pod.name,
            nodes = nodes.len(),
            existing_anti_affinity = !computed.existing_anti_affinity.is_empty(),
            "InterPodAffinity pre-filter computed"
        );
        state.write(PRE_FILTER_STATE_KEY, computed);
        Status::success()
    }
}

impl FilterPlugin for InterPodAffinity {
    fn filter(&self, state: &CycleState, pod: &Pod, node: &NodeInfo) -> Status {
        let computed = match state.read::<PreFilterState>(PRE_FILTER_STATE_KEY) {
            Ok(s) => s,
            Err(e) => return Status::error(e.to_string()),
        };

        if !computed.satisfies_existing_pods_anti_affinity(node) {
            return Status::new(
                Code::Unschedulable,
                vec![
                    ERR_REASON_AFFINITY_NOT_MATCH.to_string(),
                    ERR_REASON_EXISTING_ANTI_AFFINITY_RULES_NOT_MATCH.to_string(),
                ],
            );
        }

        if !computed.satisfies_pod_anti_affinity(pod, node) {
            return Status::new(
                Code::Unschedulable,
                vec![
                    ERR_REASON_AFFINITY_NOT_MATCH.to_string(),
                    ERR_REASON_ANTI_AFFINITY_RULES_NOT_MATCH.to_string(),
                ],
            );
        }

        if !computed.satisfies_pod_affinity(pod, node) {
            return Status::unresolvable(vec![
                ERR_REASON_AFFINITY_NOT_MATCH.to_string(),
                ERR_REASON_AFFINITY_RULES_NOT_MATCH.to_string(),
            ]);
        }

        Status::success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warpgrid_framework::{
        Affinity, LabelSelector, NodeInfoLister, PodAffinity, PodAffinityTerm, PodAntiAffinity,
        SharedLister, Snapshot, SnapshotHandle,
    };

    fn term(key: &str, app: &str) -> PodAffinityTerm {
        PodAffinityTerm::new(key, LabelSelector::new([("app", app)]))
    }

    fn with_required_affinity(pod: Pod, terms: Vec<PodAffinityTerm>) -> Pod {
        pod.with_affinity(Affinity {
            pod_affinity: Some(PodAffinity {
                required: terms,
                preferred: Vec::new(),
            }),
            pod_anti_affinity: None,
        })
    }

    fn with_required_anti_affinity(pod: Pod, terms: Vec<PodAffinityTerm>) -> Pod {
        pod.with_affinity(Affinity {
            pod_affinity: None,
            pod_anti_affinity: Some(PodAntiAffinity {
                required: terms,
                preferred: Vec::new(),
            }),
        })
    }

    fn plugin(nodes: Vec<NodeInfo>) -> (InterPodAffinity, Vec<Arc<NodeInfo>>) {
        let snapshot = Arc::new(Snapshot::new(nodes));
        let nodes = snapshot.node_infos().list().to_vec();
        let pl = InterPodAffinity::new(None, &SnapshotHandle::new(snapshot)).unwrap();
        (pl, nodes)
    }

    fn run(pl: &InterPodAffinity, pod: &Pod, nodes: &[Arc<NodeInfo>]) -> Vec<Status> {
        let state = CycleState::new();
        assert!(pl.pre_filter(&state, pod).is_success());
        nodes.iter().map(|n| pl.filter(&state, pod, n)).collect()
    }

    #[test]
    fn pod_without_affinity_fits_everywhere() {
        let (pl, nodes) = plugin(vec![
            NodeInfo::new("n1").with_label("zone", "a"),
            NodeInfo::new("n2"),
        ]);
        let pod = Pod::new("default", "p");
        assert!(run(&pl, &pod, &nodes).iter().all(Status::is_success));
    }

    #[test]
    fn filter_without_pre_filter_is_an_error() {
        let (pl, nodes) = plugin(vec![NodeInfo::new("n1")]);
        let status = pl.filter(&CycleState::new(), &Pod::new("default", "p"), &nodes[0]);
        assert_eq!(status.code(), Code::Error);
        assert!(status.message().contains(PRE_FILTER_STATE_KEY));
    }

    #[test]
    fn affinity_requires_matching_pod_in_domain() {
        let (pl, nodes) = plugin(vec![
            NodeInfo::new("n1")
                .with_label("zone", "a")
                .with_pod(Pod::new("default", "db-0").with_label("app", "db")),
            NodeInfo::new("n2").with_label("zone", "a"),
            NodeInfo::new("n3").with_label("zone", "b"),
            NodeInfo::new("n4"),
        ]);
        let pod = with_required_affinity(Pod::new("default", "web"), vec![term("zone", "db")]);
        let statuses = run(&pl, &pod, &nodes);
        assert!(statuses[0].is_success());
        assert!(statuses[1].is_success(), "same zone as db pod");
        assert_eq!(statuses[2].code(), Code::UnschedulableAndUnresolvable);
        assert_eq!(statuses[3].code(), Code::UnschedulableAndUnresolvable, "missing topology key");
        assert_eq!(
            statuses[2].reasons(),
            &[
                ERR_REASON_AFFINITY_NOT_MATCH.to_string(),
                ERR_REASON_AFFINITY_RULES_NOT_MATCH.to_string()
            ]
        );
    }

    #[test]
    fn affinity_ignores_other_namespaces() {
        let (pl, nodes) = plugin(vec![NodeInfo::new("n1")
            .with_label("zone", "a")
            .with_pod(Pod::new("other", "db-0").with_label("app", "db"))]);
        let pod = with_required_affinity(Pod::new("default", "web"), vec![term("zone", "db")]);
        assert!(!run(&pl, &pod, &nodes)[0].is_success());
    }

    #[test]
    fn first_pod_of_self_affine_group_is_allowed() {
        let (pl, nodes) = plugin(vec![NodeInfo::new("n1").with_label("zone", "a")]);
        let pod = with_required_affinity(
            Pod::new("default", "cache-0").with_label("app", "cache"),
            vec![term("zone", "cache")],
        );
        assert!(run(&pl, &pod, &nodes)[0].is_success());

        let stranger = with_required_affinity(Pod::new("default", "web"), vec![term("zone", "cache")]);
        assert!(!run(&pl, &stranger, &nodes)[0].is_success());
    }

    #[test]
    fn self_affine_pod_still_needs_topology_key() {
        let (pl, nodes) = plugin(vec![NodeInfo::new("n1")]);
        let pod = with_required_affinity(
            Pod::new("default", "cache-0").with_label("app", "cache"),
            vec![term("zone", "cache")],
        );
        assert!(!run(&pl, &pod, &nodes)[0].is_success());
    }

    #[test]
    fn anti_affinity_keeps_pods_apart() {
        let (pl, nodes) = plugin(vec![
            NodeInfo::new("n1")
                .with_label("zone", "a")
                .with_pod(Pod::new("default", "web-0").with_label("app", "web")),
            NodeInfo::new("n2").with_label("zone", "a"),
            NodeInfo::new("n3").with_label("zone", "b"),
            NodeInfo::new("n4"),
        ]);
        let pod = with_required_anti_affinity(
            Pod::new("default", "web-1").with_label("app", "web"),
            vec![term("zone", "web")],
        );
        let statuses = run(&pl, &pod, &nodes);
        assert_eq!(statuses[0].code(), Code::Unschedulable);
        assert_eq!(statuses[1].code(), Code::Unschedulable);
        assert!(statuses[1].reasons().contains(&ERR_REASON_ANTI_AFFINITY_RULES_NOT_MATCH.to_string()));
        assert!(statuses[2].is_success());
        assert!(statuses[3].is_success(), "no domain, nothing to conflict with");
    }

    #[test]
    fn existing_pods_anti_affinity_is_symmetric() {
        let guarded = with_required_anti_affinity(
            Pod::new("default", "db-0").with_label("app", "db"),
            vec![term("zone", "batch")],
        );
        let (pl, nodes) = plugin(vec![
            NodeInfo::new("n1").with_label("zone", "a").with_pod(guarded),
            NodeInfo::new("n2").with_label("zone", "a"),
            NodeInfo::new("n3").with_label("zone", "b"),
        ]);
        let pod = Pod::new("default", "job").with_label("app", "batch");
        let statuses = run(&pl, &pod, &nodes);
        assert_eq!(statuses[0].code(), Code::Unschedulable);
        assert!(statuses[1]
            .reasons()
            .contains(&ERR_REASON_EXISTING_ANTI_AFFINITY_RULES_NOT_MATCH.to_string()));
        assert!(statuses[2].is_success());

        let unrelated = Pod::new("default", "web").with_label("app", "web");
        assert!(run(&pl, &unrelated, &nodes).iter().all(Status::is_success));
    }

    #[test]
    fn affinity_needs_one_pod_matching_every_term() {
        let (pl, nodes) = plugin(vec![
            NodeInfo::new("n1")
                .with_label("zone", "a")
                .with_pod(Pod::new("default", "db-0").with_label("app", "db")),
            NodeInfo::new("n2")
                .with_label("zone", "a")
                .with_pod(Pod::new("default", "cache-0").with_label("app", "cache")),
        ]);
        let pod = with_required_affinity(
            Pod::new("default", "web"),
            vec![term("zone", "db"), term("zone", "cache")],
        );
        assert!(run(&pl, &pod, &nodes).iter().all(|s| !s.is_success()));
    }
}
