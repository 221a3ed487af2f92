use std::path::Path;
use std::sync::Arc;

use warpgrid_framework::{Framework, Pod, Profile, ScheduleResult, Snapshot, SnapshotHandle};

use super::default_registry;

pub fn schedule(config: &str, snapshot: &str, pod: &str, format: &str) -> anyhow::Result<()> {
    let result = run(Path::new(config), Path::new(snapshot), Path::new(pod))?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print!("{}", format_result(&result));
        }
    }

    Ok(())
}

pub fn run(config: &Path, snapshot: &Path, pod: &Path) -> anyhow::Result<ScheduleResult> {
    let profile = Profile::from_file(config)?;
    let snapshot = Snapshot::from_json(&std::fs::read_to_string(snapshot)?)?;
    let pod: Pod = serde_json::from_str(&std::fs::read_to_string(pod)?)?;

    let registry = default_registry()?;
    let handle = SnapshotHandle::new(Arc::new(snapshot));
    let framework = Framework::new(&registry, &profile, &handle)?;
    Ok(framework.run_cycle(&pod)?)
}

pub fn format_result(result: &ScheduleResult) -> String {
    let mut out = String::new();
    match &result.suggested_host {
        Some(host) => out.push_str(&format!("✓ {} → {}\n", result.pod, host)),
        None => out.push_str(&format!("✗ {} is unschedulable\n", result.pod)),
    }
    for score in &result.ranked {
        out.push_str(&format!("  {:>5}  {}\n", score.score, score.name));
    }
    for rejection in &result.rejected {
        out.push_str(&format!(
            "  rejected {} by {}: {}\n",
            rejection.node,
            rejection.plugin,
            rejection.status.message()
        ));
    }
    out
}
