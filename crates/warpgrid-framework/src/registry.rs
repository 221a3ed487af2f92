//! Plugin registry — maps plugin names to their factories.

use std::collections::BTreeMap;

use crate::args::RawArgs;
use crate::error::{FrameworkError, FrameworkResult};
use crate::handle::FrameworkHandle;
use crate::plugin::RegisteredPlugin;

/// Error type plugin factories return; each plugin keeps its own
/// structured error behind it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Builds a plugin from its args and the framework handle.
pub type PluginFactory =
    Box<dyn Fn(Option<&RawArgs>, &dyn FrameworkHandle) -> Result<RegisteredPlugin, BoxError> + Send + Sync>;

/// Every plugin the host knows how to build, by name.
#[derive(Default)]
pub struct Registry {
    factories: BTreeMap<String, PluginFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory. Names are unique.
    pub fn register(&mut self, name: &str, factory: PluginFactory) -> FrameworkResult<()> {
        if self.factories.contains_key(name) {
            return Err(FrameworkError::AlreadyRegistered(name.to_string()));
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> FrameworkResult<()> {
        self.factories
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| FrameworkError::NotRegistered(name.to_string()))
    }

    /// Move every factory of `other` into `self`, failing on the first
    /// name that is already present.
    pub fn merge(&mut self, other: Registry) -> FrameworkResult<()> {
        for (name, factory) in other.factories {
            self.register(&name, factory)?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&PluginFactory> {
        self.factories.get(name)
    }
}
