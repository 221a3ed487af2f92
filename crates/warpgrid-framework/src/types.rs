//! Scheduling data model: pods, nodes, and inter-pod affinity terms.
//!
//! All types serialize as camelCase JSON so that snapshots and pods can be
//! loaded from files by operators and tests alike.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A workload waiting to be placed, or already running on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Default for Pod {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            name: String::new(),
            labels: BTreeMap::new(),
            affinity: None,
        }
    }
}

impl Pod {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            labels: BTreeMap::new(),
            affinity: None,
        }
    }

    /// Builder method: add a label.
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Builder method: set the affinity block.
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = Some(affinity);
        self
    }

    /// Required (hard) pod affinity terms, empty when none are set.
    pub fn required_affinity_terms(&self) -> &[PodAffinityTerm] {
        self.affinity
            .as_ref()
            .and_then(|a| a.pod_affinity.as_ref())
            .map(|pa| pa.required.as_slice())
            .unwrap_or(&[])
    }

    /// Preferred (soft) pod affinity terms.
    pub fn preferred_affinity_terms(&self) -> &[WeightedPodAffinityTerm] {
        self.affinity
            .as_ref()
            .and_then(|a| a.pod_affinity.as_ref())
            .map(|pa| pa.preferred.as_slice())
            .unwrap_or(&[])
    }

    /// Required (hard) pod anti-affinity terms.
    pub fn required_anti_affinity_terms(&self) -> &[PodAffinityTerm] {
        self.affinity
            .as_ref()
            .and_then(|a| a.pod_anti_affinity.as_ref())
            .map(|pa| pa.required.as_slice())
            .unwrap_or(&[])
    }

    /// Preferred (soft) pod anti-affinity terms.
    pub fn preferred_anti_affinity_terms(&self) -> &[WeightedPodAffinityTerm] {
        self.affinity
            .as_ref()
            .and_then(|a| a.pod_anti_affinity.as_ref())
            .map(|pa| pa.preferred.as_slice())
            .unwrap_or(&[])
    }

    /// True if the pod declares any affinity or anti-affinity term.
    pub fn has_affinity_constraints(&self) -> bool {
        !self.required_affinity_terms().is_empty()
            || !self.preferred_affinity_terms().is_empty()
            || !self.required_anti_affinity_terms().is_empty()
            || !self.preferred_anti_affinity_terms().is_empty()
    }
}

/// Inter-pod placement preferences and constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affinity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<PodAffinity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<PodAntiAffinity>,
}

/// Co-locate with pods matching the terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodAffinity {
    #[serde(default)]
    pub required: Vec<PodAffinityTerm>,
    #[serde(default)]
    pub preferred: Vec<WeightedPodAffinityTerm>,
}

/// Keep away from pods matching the terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodAntiAffinity {
    #[serde(default)]
    pub required: Vec<PodAffinityTerm>,
    #[serde(default)]
    pub preferred: Vec<WeightedPodAffinityTerm>,
}

/// Selects a set of pods and the topology domain they are grouped by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodAffinityTerm {
    /// `None` selects nothing; an empty selector selects every pod.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    /// Namespaces the selector applies to. Empty means the namespace of
    /// the pod that owns the term.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Node label whose value defines the topology domain.
    pub topology_key: String,
}

impl PodAffinityTerm {
    pub fn new(topology_key: &str, selector: LabelSelector) -> Self {
        Self {
            label_selector: Some(selector),
            namespaces: Vec::new(),
            topology_key: topology_key.to_string(),
        }
    }

    /// Whether `target` is selected by this term, where `owner` is the pod
    /// that declares the term.
    pub fn matches(&self, owner: &Pod, target: &Pod) -> bool {
        let in_namespace = if self.namespaces.is_empty() {
            target.namespace == owner.namespace
        } else {
            self.namespaces.iter().any(|ns| *ns == target.namespace)
        };
        if !in_namespace {
            return false;
        }
        self.label_selector
            .as_ref()
            .is_some_and(|s| s.matches(&target.labels))
    }
}

/// A soft term with the weight it contributes to a node's score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedPodAffinityTerm {
    pub weight: i32,
    pub pod_affinity_term: PodAffinityTerm,
}

/// Exact-match label selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            match_labels: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|lv| lv == v))
    }
}

/// A placement target together with the pods already running on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

impl NodeInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            labels: BTreeMap::new(),
            pods: Vec::new(),
        }
    }

    /// Builder method: add a node label.
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Builder method: add a running pod.
    pub fn with_pod(mut self, pod: Pod) -> Self {
        self.pods.push(pod);
        self
    }

    /// The node's topology domain for `key`, if it carries that label.
    pub fn topology_value(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}
