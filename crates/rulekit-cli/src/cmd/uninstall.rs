use anyhow::Context;
use rulekit_core::{config::Config, installer};
use std::path::Path;

use super::EXIT_OK;

/// `rulekit uninstall` — remove entry points and the sync baseline.
/// The installed document tree and config.yaml are preserved.
pub fn run(root: &Path, force: bool) -> anyhow::Result<i32> {
    if !force {
        anyhow::bail!("uninstall removes agent entry points and sync state; pass --force to confirm");
    }

    let config = Config::load(root).context("failed to load config.yaml")?;
    let removed = installer::uninstall(root, &config).context("uninstall failed")?;

    if removed.is_empty() {
        println!("Nothing to uninstall.");
    } else {
        for target in &removed {
            println!("  removed: {target}");
        }
        println!("\nDocs under docs/ were preserved.");
    }

    Ok(EXIT_OK)
}
