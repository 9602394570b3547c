use anyhow::Context;
use rulekit_core::{config::Config, installer};
use std::path::Path;

use super::{EXIT_OK, EXIT_PENDING};
use crate::output::print_json;

/// `rulekit install` — (re)wire agent entry points without syncing docs.
///
/// `--include`/`--exclude` patterns are persisted to config.yaml so later
/// `init`/`update` runs apply the same filter.
pub fn run(
    root: &Path,
    include: Vec<String>,
    exclude: Vec<String>,
    json: bool,
) -> anyhow::Result<i32> {
    let mut config = Config::load(root).context("failed to load config.yaml")?;

    if !include.is_empty() || !exclude.is_empty() {
        config.cursor.include = include;
        config.cursor.exclude = exclude;
        config.save(root).context("failed to save config.yaml")?;
    }

    let report = installer::install(root, &config).context("installer failed")?;

    if json {
        print_json(&report)?;
    } else {
        for entry in &report.entries {
            println!("  {}: {}", entry.outcome.as_str(), entry.target);
        }
    }

    for entry in report.conflicts() {
        eprintln!("conflict: {} (foreign content, left untouched)", entry.target);
    }

    Ok(if report.has_conflicts() {
        EXIT_PENDING
    } else {
        EXIT_OK
    })
}
