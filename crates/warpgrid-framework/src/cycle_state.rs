//! Per-cycle scratch storage shared between a plugin's extension points.
//!
//! A `CycleState` is created by the runner at the start of every
//! scheduling cycle and dropped when the cycle ends, so nothing written
//! here outlives the pod it was computed for. Plugins stash precomputed
//! data in pre-filter / pre-score and read it back from filter / score,
//! which may run concurrently for different nodes.
//!
//! # Concurrency
//!
//! Values are stored as `Arc<dyn Any + Send + Sync>` behind a
//! `std::sync::RwLock`. Readers clone the `Arc` out and drop the lock
//! before doing any work with the value. A poisoned lock is recovered:
//! every write is a single map insert or remove, so the map is never
//! left half-updated.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{FrameworkError, FrameworkResult};

type StateValue = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct CycleState {
    storage: RwLock<HashMap<String, StateValue>>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn write<T: Any + Send + Sync>(&self, key: &str, value: T) {
        let mut storage = self.storage.write().unwrap_or_else(PoisonError::into_inner);
        storage.insert(key.to_string(), Arc::new(value));
    }

    /// Read the value stored under `key` as a `T`.
    ///
    /// A missing key and a value of another type are both reported as
    /// [`FrameworkError::StateNotFound`].
    pub fn read<T: Any + Send + Sync>(&self, key: &str) -> FrameworkResult<Arc<T>> {
        let value = {
            let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
            storage.get(key).cloned()
        };
        value
            .and_then(|v| v.downcast::<T>().ok())
            .ok_or_else(|| FrameworkError::StateNotFound(key.to_string()))
    }

    pub fn delete(&self, key: &str) {
        self.storage.write().unwrap_or_else(PoisonError::into_inner).remove(key);
    }

    pub fn len(&self) -> usize {
        self.storage.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
