//! Scheduling profile parser.
//!
//! ```toml
//! scheduler_name = "default-scheduler"
//!
//! [[plugins]]
//! name = "InterPodAffinity"
//! weight = 2
//!
//! [plugins.args]
//! hardPodAffinityWeight = 5
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::args::RawArgs;
use crate::error::{FrameworkError, FrameworkResult};

const DEFAULT_SCHEDULER_NAME: &str = "default-scheduler";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_scheduler_name")]
    pub scheduler_name: String,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    /// Multiplier applied to this plugin's normalized scores.
    pub weight: Option<i64>,
    /// Plugin-specific args, handed to the factory as TOML.
    pub args: Option<toml::Table>,
}

fn default_scheduler_name() -> String {
    DEFAULT_SCHEDULER_NAME.to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            scheduler_name: default_scheduler_name(),
            plugins: Vec::new(),
        }
    }
}

impl Profile {
    pub fn from_file(path: &Path) -> FrameworkResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> FrameworkResult<Self> {
        let profile: Profile = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_toml_string(&self) -> FrameworkResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject duplicate plugin names and non-positive weights.
    pub fn validate(&self) -> FrameworkResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.plugins {
            if !seen.insert(entry.name.as_str()) {
                return Err(FrameworkError::DuplicatePlugin {
                    name: entry.name.clone(),
                });
            }
            let weight = entry.score_weight();
            if weight < 1 {
                return Err(FrameworkError::InvalidWeight {
                    name: entry.name.clone(),
                    weight,
                });
            }
        }
        Ok(())
    }

    /// Builder method: enable a plugin with default weight and no args.
    pub fn with_plugin(mut self, name: &str) -> Self {
        self.plugins.push(PluginEntry {
            name: name.to_string(),
            weight: None,
            args: None,
        });
        self
    }
}

impl PluginEntry {
    pub fn score_weight(&self) -> i64 {
        self.weight.unwrap_or(1)
    }

    /// The entry's args as an opaque blob for the plugin factory.
    pub fn raw_args(&self) -> FrameworkResult<Option<RawArgs>> {
        self.args
            .as_ref()
            .map(RawArgs::from_toml_table)
            .transpose()
            .map_err(FrameworkError::ProfileSerialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::CONTENT_TYPE_TOML;

    #[test]
    fn parse_minimal() {
        let profile = Profile::from_toml_str("").unwrap();
        assert_eq!(profile.scheduler_name, "default-scheduler");
        assert!(profile.plugins.is_empty());
    }

    #[test]
    fn parse_plugin_with_args() {
        let toml_str = r#"
scheduler_name = "edge"

[[plugins]]
name = "InterPodAffinity"
weight = 2

[plugins.args]
hardPodAffinityWeight = 5
"#;
        let profile = Profile::from_toml_str(toml_str).unwrap();
        assert_eq!(profile.scheduler_name, "edge");
        let entry = &profile.plugins[0];
        assert_eq!(entry.score_weight(), 2);

        let raw = entry.raw_args().unwrap().unwrap();
        assert_eq!(raw.content_type, CONTENT_TYPE_TOML);
        let text = String::from_utf8(raw.raw.unwrap()).unwrap();
        assert!(text.contains("hardPodAffinityWeight = 5"));
    }

    #[test]
    fn missing_args_stay_absent() {
        let profile = Profile::default().with_plugin("InterPodAffinity");
        assert!(profile.plugins[0].raw_args().unwrap().is_none());
        assert_eq!(profile.plugins[0].score_weight(), 1);
    }

    #[test]
    fn rejects_non_table_args() {
        for args in ["5", "\"fast\"", "[1]"] {
            let toml_str = format!("[[plugins]]\nname = \"InterPodAffinity\"\nargs = {args}\n");
            let err = Profile::from_toml_str(&toml_str).unwrap_err();
            assert!(matches!(err, FrameworkError::Profile(_)), "args = {args}: {err}");
        }
    }

    #[test]
    fn inline_table_args_reach_the_blob() {
        let toml_str = "[[plugins]]\nname = \"InterPodAffinity\"\nargs = { hardPodAffinityWeight = 3 }\n";
        let profile = Profile::from_toml_str(toml_str).unwrap();
        let raw = profile.plugins[0].raw_args().unwrap().unwrap();
        let text = String::from_utf8(raw.raw.unwrap()).unwrap();
        assert!(text.contains("hardPodAffinityWeight = 3"));
    }

    #[test]
    fn rejects_duplicate_plugins() {
        let toml_str = r#"
[[plugins]]
name = "A"

[[plugins]]
name = "A"
"#;
        let err = Profile::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, FrameworkError::DuplicatePlugin { ref name } if name == "A"));
    }

    #[test]
    fn rejects_zero_weight() {
        let toml_str = r#"
[[plugins]]
name = "A"
weight = 0
"#;
        let err = Profile::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, FrameworkError::InvalidWeight { weight: 0, .. }));
    }

    #[test]
    fn round_trips_through_toml() {
        let profile = Profile::default().with_plugin("InterPodAffinity");
        let text = profile.to_toml_string().unwrap();
        let back = Profile::from_toml_str(&text).unwrap();
        assert_eq!(back.plugins[0].name, "InterPodAffinity");
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "[[plugins]]\nname = \"InterPodAffinity\"\n").unwrap();
        let profile = Profile::from_file(&path).unwrap();
        assert_eq!(profile.plugins.len(), 1);
    }
}
