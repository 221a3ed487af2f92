//! warpgrid-framework — the host side of the WarpGrid scheduling plugin protocol.
//!
//! Plugins influence pod placement by implementing one or more extension
//! points. The framework owns everything around them: the snapshot of
//! cluster state they read, the per-cycle scratch space they write, the
//! opaque args blobs they decode, and the runner that drives a cycle.
//!
//! # Architecture
//!
//! ```text
//! Profile (TOML) ──► Framework::new ──► Registry factory per plugin
//!                                          │
//!                                          ▼
//!                                   RegisteredPlugin
//!                                   (pre-filter / filter / pre-score / score)
//!
//! Framework::run_cycle(pod)
//!   ├── CycleState (fresh per cycle)
//!   ├── pre_filter  → filter (every node) → pre_score → score + normalize
//!   └── ScheduleResult (ranked feasible nodes, rejections, suggested host)
//! ```
//!
//! The snapshot (`SharedLister`) is shared read-only between the host and
//! every plugin. Plugins never mutate it.

pub mod args;
pub mod cycle_state;
pub mod error;
pub mod framework;
pub mod handle;
pub mod listers;
pub mod plugin;
pub mod profile;
pub mod registry;
pub mod status;
pub mod types;

pub use args::{DecodeError, RawArgs, decode_into};
pub use cycle_state::CycleState;
pub use error::{FrameworkError, FrameworkResult};
pub use framework::{Framework, NodeRejection, ScheduleResult};
pub use handle::{FrameworkHandle, SnapshotHandle};
pub use listers::{NodeInfoLister, SharedLister, Snapshot};
pub use plugin::{
    FilterPlugin, MAX_NODE_SCORE, MIN_NODE_SCORE, NodeScore, Plugin, PreFilterPlugin,
    PreScorePlugin, RegisteredPlugin, ScorePlugin,
};
pub use profile::{PluginEntry, Profile};
pub use registry::{BoxError, PluginFactory, Registry};
pub use status::{Code, Status};
pub use types::*;
