use anyhow::Context;
use rulekit_core::{
    catalog::Catalog, config::Config, engine, executor, installer, scanner, state::SyncState,
};
use std::path::Path;

use super::{EXIT_OK, EXIT_PENDING};
use crate::output::print_json;

/// `rulekit update` — three-way sync of the catalog into the target repo.
///
/// Fatal errors (no catalog, uninitialized, corrupt state) abort before any
/// write. Per-document conflicts and write failures are collected; the rest
/// of the batch still lands.
pub fn run(root: &Path, json: bool) -> anyhow::Result<i32> {
    let catalog = Catalog::embedded().context("failed to load document catalog")?;
    let mut state = SyncState::load(root)?;
    let mut config = Config::load(root).context("failed to load config.yaml")?;

    let scanned = scanner::scan(root, &catalog, Some(&state)).context("scan failed")?;
    let plan = engine::plan(&catalog, &scanned);
    let summary = executor::apply(root, &plan, &mut state, catalog.version())
        .context("failed to apply sync plan")?;

    // Entry points may reference docs that just changed; refresh them.
    let report = installer::install(root, &config).context("installer failed")?;
    let stamped = super::init::stamp_rulekit_version(root, &mut config)?;

    if json {
        #[derive(serde::Serialize)]
        struct UpdateOutput<'a> {
            catalog_version: &'a str,
            summary: &'a executor::SyncSummary,
            install: &'a installer::InstallReport,
        }
        print_json(&UpdateOutput {
            catalog_version: catalog.version(),
            summary: &summary,
            install: &report,
        })?;
    } else {
        println!("Syncing docs in: {}", root.display());
        for path in &summary.created {
            println!("  created: {path}");
        }
        for path in &summary.updated {
            println!("  updated: {path}");
        }
        for failure in &summary.failed {
            println!("  failed:  {} ({})", failure.path, failure.reason);
        }
        for entry in report
            .entries
            .iter()
            .filter(|e| e.outcome != installer::InstallOutcome::Unchanged)
        {
            println!("  {}: {}", entry.outcome.as_str(), entry.target);
        }
        if let Some(previous) = &stamped {
            println!(
                "  stamped: rulekit_version {previous} -> {}",
                super::init::RULEKIT_BINARY_VERSION
            );
        }
        println!("\nSummary: {}", summary.one_line());
    }

    for path in &summary.conflicts {
        eprintln!("conflict: {path} (local and upstream both changed; resolve manually)");
    }
    for entry in report.conflicts() {
        eprintln!("conflict: {} (foreign content, left untouched)", entry.target);
    }

    if !summary.failed.is_empty() {
        anyhow::bail!("{} document(s) failed to write", summary.failed.len());
    }
    if !summary.conflicts.is_empty() || report.has_conflicts() {
        return Ok(EXIT_PENDING);
    }
    Ok(EXIT_OK)
}
