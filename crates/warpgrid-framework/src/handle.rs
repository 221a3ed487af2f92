//! Host-provided dependencies a plugin may ask for at construction time.

use std::sync::Arc;

use crate::listers::SharedLister;

/// What the framework exposes to plugin factories.
pub trait FrameworkHandle: Send + Sync {
    /// The snapshot lister shared by every plugin in the profile, or `None`
    /// if the host was built without one.
    fn snapshot_shared_lister(&self) -> Option<Arc<dyn SharedLister>>;
}

/// A handle backed by a fixed (possibly absent) snapshot lister.
#[derive(Clone, Default)]
pub struct SnapshotHandle {
    lister: Option<Arc<dyn SharedLister>>,
}

impl SnapshotHandle {
    pub fn new(lister: Arc<dyn SharedLister>) -> Self {
        Self {
            lister: Some(lister),
        }
    }

    /// A handle with no snapshot lister.
    pub fn empty() -> Self {
        Self { lister: None }
    }
}

impl FrameworkHandle for SnapshotHandle {
    fn snapshot_shared_lister(&self) -> Option<Arc<dyn SharedLister>> {
        self.lister.clone()
    }
}
