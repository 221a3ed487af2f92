//! Plugin args.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_HARD_POD_AFFINITY_WEIGHT: i32 = 1;
pub const MIN_HARD_POD_AFFINITY_WEIGHT: i32 = 0;
pub const MAX_HARD_POD_AFFINITY_WEIGHT: i32 = 100;

/// Args for `InterPodAffinity`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterPodAffinityArgs {
    /// Score contributed to a node for every existing pod whose *required*
    /// affinity term selects the incoming pod. `0` turns the symmetric
    /// contribution off; absent means [`DEFAULT_HARD_POD_AFFINITY_WEIGHT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_pod_affinity_weight: Option<i32>,
}

impl InterPodAffinityArgs {
    pub fn with_hard_pod_affinity_weight(weight: i32) -> Self {
        Self {
            hard_pod_affinity_weight: Some(weight),
        }
    }

    /// The weight the plugin runs with.
    pub fn effective_hard_pod_affinity_weight(&self) -> i32 {
        self.hard_pod_affinity_weight
            .unwrap_or(DEFAULT_HARD_POD_AFFINITY_WEIGHT)
    }
}

/// Check `args` against the allowed ranges. Absent fields always pass.
pub fn validate_args(args: &InterPodAffinityArgs) -> Result<(), ValidationError> {
    let Some(weight) = args.hard_pod_affinity_weight else {
        return Ok(());
    };
    if !(MIN_HARD_POD_AFFINITY_WEIGHT..=MAX_HARD_POD_AFFINITY_WEIGHT).contains(&weight) {
        return Err(ValidationError::HardPodAffinityWeightOutOfRange {
            weight,
            min: MIN_HARD_POD_AFFINITY_WEIGHT,
            max: MAX_HARD_POD_AFFINITY_WEIGHT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_weight_is_valid() {
        assert!(validate_args(&InterPodAffinityArgs::default()).is_ok());
        assert_eq!(
            InterPodAffinityArgs::default().effective_hard_pod_affinity_weight(),
            1
        );
    }

    #[test]
    fn whole_range_is_valid() {
        for w in MIN_HARD_POD_AFFINITY_WEIGHT..=MAX_HARD_POD_AFFINITY_WEIGHT {
            let args = InterPodAffinityArgs::with_hard_pod_affinity_weight(w);
            assert!(validate_args(&args).is_ok(), "weight {w} should be valid");
        }
    }

    #[test]
    fn out_of_range_is_rejected() {
        for w in [-1, -5, 101, 150, i32::MIN, i32::MAX] {
            let args = InterPodAffinityArgs::with_hard_pod_affinity_weight(w);
            let err = validate_args(&args).unwrap_err();
            assert_eq!(
                err,
                ValidationError::HardPodAffinityWeightOutOfRange {
                    weight: w,
                    min: 0,
                    max: 100
                }
            );
            let msg = err.to_string();
            assert!(msg.contains(&w.to_string()), "{msg}");
            assert!(msg.contains("0-100"), "{msg}");
        }
    }

    #[test]
    fn error_message_for_operators() {
        let err = validate_args(&InterPodAffinityArgs::with_hard_pod_affinity_weight(150)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid args.hardPodAffinityWeight: 150, must be in the range 0-100"
        );
    }

    #[test]
    fn json_field_name() {
        let args: InterPodAffinityArgs = serde_json::from_str(r#"{"hardPodAffinityWeight": 7}"#).unwrap();
        assert_eq!(args.hard_pod_affinity_weight, Some(7));
        assert_eq!(serde_json::to_string(&args).unwrap(), r#"{"hardPodAffinityWeight":7}"#);
    }
}
