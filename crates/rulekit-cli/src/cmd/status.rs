use anyhow::Context;
use rulekit_core::{catalog::Catalog, engine, scanner, state::SyncState};
use std::path::Path;

use super::{EXIT_OK, EXIT_PENDING};
use crate::output::{print_json, print_table};

/// `rulekit status` — classify every catalog document without writing.
pub fn run(root: &Path, json: bool) -> anyhow::Result<i32> {
    let catalog = Catalog::embedded().context("failed to load document catalog")?;
    let state = SyncState::load(root)?;

    let scanned = scanner::scan(root, &catalog, Some(&state)).context("scan failed")?;
    let plan = engine::plan(&catalog, &scanned);
    let pending = plan.iter().filter(|d| d.action.is_pending()).count();

    if json {
        #[derive(serde::Serialize)]
        struct DocStatus<'a> {
            path: &'a str,
            action: engine::Action,
        }
        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            catalog_version: &'a str,
            synced_catalog_version: &'a str,
            pending: usize,
            documents: Vec<DocStatus<'a>>,
        }
        print_json(&StatusOutput {
            catalog_version: catalog.version(),
            synced_catalog_version: &state.catalog_version,
            pending,
            documents: plan
                .iter()
                .map(|d| DocStatus {
                    path: d.path,
                    action: d.action,
                })
                .collect(),
        })?;
    } else {
        println!("Catalog: {}", catalog.version());
        if state.catalog_version != catalog.version() {
            println!("Synced:  {} (out of date)", state.catalog_version);
        }
        println!();

        let rows: Vec<Vec<String>> = plan
            .iter()
            .map(|d| {
                let note = match d.action {
                    engine::Action::Conflict => "local and upstream both changed",
                    _ => "",
                };
                vec![
                    d.path.to_string(),
                    d.action.to_string(),
                    note.to_string(),
                ]
            })
            .collect();
        print_table(&["PATH", "ACTION", "NOTE"], rows);

        if pending == 0 {
            println!("\nEverything in sync.");
        } else {
            println!("\n{pending} pending action(s). Run: rulekit update");
        }
    }

    Ok(if pending == 0 { EXIT_OK } else { EXIT_PENDING })
}
