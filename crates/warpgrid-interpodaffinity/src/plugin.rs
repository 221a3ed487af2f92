//! Plugin construction and registration.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use warpgrid_framework::{
    BoxError, FilterPlugin, FrameworkHandle, FrameworkResult, Plugin, PreFilterPlugin,
    PreScorePlugin, RawArgs, RegisteredPlugin, Registry, ScorePlugin, SharedLister, decode_into,
};

use crate::args::{InterPodAffinityArgs, validate_args};
use crate::error::{InterPodAffinityError, InterPodAffinityResult};

/// Name of the plugin in the registry and in profiles.
pub const NAME: &str = "InterPodAffinity";

const _: () = {
    const fn assert_pre_filter<T: PreFilterPlugin>() {}
    const fn assert_filter<T: FilterPlugin>() {}
    const fn assert_pre_score<T: PreScorePlugin>() {}
    const fn assert_score<T: ScorePlugin>() {}
    assert_pre_filter::<InterPodAffinity>();
    assert_filter::<InterPodAffinity>();
    assert_pre_score::<InterPodAffinity>();
    assert_score::<InterPodAffinity>();
};

/// Checks inter-pod affinity.
///
/// Everything on the instance is immutable after construction, so one
/// instance serves concurrent cycles without locking. Per-pod results
/// live in the cycle state.
pub struct InterPodAffinity {
    pub(crate) shared_lister: Arc<dyn SharedLister>,
    pub(crate) hard_pod_affinity_weight: i32,
}

impl InterPodAffinity {
    /// Build the plugin from its args and the framework handle.
    ///
    /// Checks, in order: the handle has a snapshot lister, the args decode,
    /// the decoded args validate.
    pub fn new(args: Option<&RawArgs>, handle: &dyn FrameworkHandle) -> InterPodAffinityResult<Self> {
        let shared_lister = handle
            .snapshot_shared_lister()
            .ok_or(InterPodAffinityError::MissingDependency)?;

        let args: InterPodAffinityArgs = decode_into(args)?;
        validate_args(&args)?;

        let hard_pod_affinity_weight = args.effective_hard_pod_affinity_weight();
        debug!(hard_pod_affinity_weight, "InterPodAffinity plugin constructed");

        Ok(Self {
            shared_lister,
            hard_pod_affinity_weight,
        })
    }

    pub fn hard_pod_affinity_weight(&self) -> i32 {
        self.hard_pod_affinity_weight
    }
}

impl Plugin for InterPodAffinity {
    fn name(&self) -> &str {
        NAME
    }
}

impl fmt::Debug for InterPodAffinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterPodAffinity")
            .field("hard_pod_affinity_weight", &self.hard_pod_affinity_weight)
            .finish_non_exhaustive()
    }
}

/// Add the plugin's factory to `registry`.
pub fn register(registry: &mut Registry) -> FrameworkResult<()> {
    registry.register(
        NAME,
        Box::new(|args: Option<&RawArgs>, handle: &dyn FrameworkHandle| {
            let pl = Arc::new(InterPodAffinity::new(args, handle)?);
            Ok::<_, BoxError>(
                RegisteredPlugin::new(NAME)
                    .with_pre_filter(pl.clone())
                    .with_filter(pl.clone())
                    .with_pre_score(pl.clone())
                    .with_score(pl),
            )
        }),
    )
}
