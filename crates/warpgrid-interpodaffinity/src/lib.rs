//! warpgrid-interpodaffinity — the `InterPodAffinity` scheduling plugin.
//!
//! Places pods relative to pods already running in the cluster: required
//! affinity and anti-affinity terms filter nodes out, preferred terms (and
//! the required affinity terms of existing pods, scaled by
//! `hardPodAffinityWeight`) rank the nodes that remain.
//!
//! # Components
//!
//! - **`args`** — plugin args, defaults, and validation
//! - **`plugin`** — construction from a framework handle, registration
//! - **`filtering`** — pre-filter and filter extension points
//! - **`scoring`** — pre-score and score extension points
//! - **`topology`** — per-topology-domain counters shared by both

pub mod args;
pub mod error;
pub mod filtering;
pub mod plugin;
pub mod scoring;
mod topology;

pub use args::{
    DEFAULT_HARD_POD_AFFINITY_WEIGHT, InterPodAffinityArgs, MAX_HARD_POD_AFFINITY_WEIGHT,
    MIN_HARD_POD_AFFINITY_WEIGHT, validate_args,
};
pub use error::{InterPodAffinityError, InterPodAffinityResult, ValidationError};
pub use plugin::{InterPodAffinity, NAME, register};
