//! InterPodAffinity error types.

use thiserror::Error;
use warpgrid_framework::DecodeError;

/// Args validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid args.hardPodAffinityWeight: {weight}, must be in the range {min}-{max}")]
    HardPodAffinityWeightOutOfRange { weight: i32, min: i32, max: i32 },
}

/// Errors constructing the plugin. All of them are configuration defects
/// and are never retried.
#[derive(Debug, Error)]
pub enum InterPodAffinityError {
    #[error("snapshot lister is nil")]
    MissingDependency,

    #[error("decoding args: {0}")]
    DecodeFailure(#[from] DecodeError),

    #[error(transparent)]
    InvalidConfig(#[from] ValidationError),
}

pub type InterPodAffinityResult<T> = Result<T, InterPodAffinityError>;
