pub mod check;
pub mod schedule;

use warpgrid_framework::Registry;

/// Every plugin this binary can build.
pub fn default_registry() -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    warpgrid_interpodaffinity::register(&mut registry)?;
    Ok(registry)
}
