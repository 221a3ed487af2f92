use std::path::Path;
use std::sync::Arc;

use tracing::info;
use warpgrid_framework::{Framework, Profile, Snapshot, SnapshotHandle};

use super::default_registry;

pub fn check(config: &str) -> anyhow::Result<()> {
    info!(config, "checking profile");
    let report = check_report(Path::new(config))?;
    print!("{report}");
    Ok(())
}

/// Build the profile against an empty snapshot and describe it.
pub fn check_report(config: &Path) -> anyhow::Result<String> {
    let profile = Profile::from_file(config)?;
    let registry = default_registry()?;
    let handle = SnapshotHandle::new(Arc::new(Snapshot::default()));
    let framework = Framework::new(&registry, &profile, &handle)?;

    let mut out = format!("✓ Profile {} is valid\n", framework.profile_name());
    for plugin in framework.plugins() {
        out.push_str(&format!(
            "  {}: {}\n",
            plugin.name(),
            plugin.extension_points().join(", ")
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_profile(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("profile.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reports_extension_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "[[plugins]]\nname = \"InterPodAffinity\"\n");
        let report = check_report(&path).unwrap();
        assert!(report.contains("default-scheduler"));
        assert!(report.contains("InterPodAffinity: PreFilter, Filter, PreScore, Score"));
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(
            dir.path(),
            "[[plugins]]\nname = \"InterPodAffinity\"\n[plugins.args]\nhardPodAffinityWeight = 101\n",
        );
        let err = check_report(&path).unwrap_err();
        assert!(err.to_string().contains("101"));
    }

    #[test]
    fn rejects_unknown_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "[[plugins]]\nname = \"NodeAffinity\"\n");
        let err = check_report(&path).unwrap_err();
        assert!(err.to_string().contains("NodeAffinity"));
    }
}
