use crate::engine::{Action, DocPlan};
use crate::error::Result;
use crate::io;
use crate::paths;
use crate::state::SyncState;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct DocFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of one sync run. Conflicts and per-document write failures are
/// collected here rather than aborting the batch.
#[derive(Debug, Default, Serialize)]
pub struct SyncSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: usize,
    pub conflicts: Vec<String>,
    pub failed: Vec<DocFailure>,
}

impl SyncSummary {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.failed.is_empty()
    }

    pub fn one_line(&self) -> String {
        format!(
            "{} created, {} updated, {} skipped, {} conflict(s), {} failed",
            self.created.len(),
            self.updated.len(),
            self.skipped,
            self.conflicts.len(),
            self.failed.len()
        )
    }
}

/// Apply a sync plan to the target repository.
///
/// `Create`/`Update` write upstream content atomically and advance the
/// document's baseline. A write failure is fatal for that document only: the
/// baseline stays put and the run continues. `Conflict` never writes — the
/// old baseline is kept so the document is re-evaluated on the next run.
/// `Skip` advances the baseline only when local content already equals
/// upstream (adoption or convergence).
///
/// The state file is rewritten atomically once, after the whole batch.
pub fn apply(
    root: &Path,
    plan: &[DocPlan<'_>],
    state: &mut SyncState,
    catalog_version: &str,
) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();

    for doc in plan {
        match doc.action {
            Action::Create | Action::Update => {
                let target = paths::doc_path(root, doc.path);
                match io::atomic_write(&target, doc.upstream) {
                    Ok(()) => {
                        state.set_baseline(doc.path, doc.upstream_hash);
                        if doc.action == Action::Create {
                            summary.created.push(doc.path.to_string());
                        } else {
                            summary.updated.push(doc.path.to_string());
                        }
                    }
                    Err(e) => {
                        warn!(path = doc.path, error = %e, "document write failed");
                        summary.failed.push(DocFailure {
                            path: doc.path.to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            Action::Skip => {
                summary.skipped += 1;
                if doc.local_hash == Some(doc.upstream_hash) {
                    state.set_baseline(doc.path, doc.upstream_hash);
                }
            }
            Action::Conflict => {
                summary.conflicts.push(doc.path.to_string());
            }
        }
    }

    // Baselines for documents dropped from the catalog no longer mean
    // anything; prune them so the state mirrors the catalog's key set.
    let live: std::collections::BTreeSet<&str> = plan.iter().map(|d| d.path).collect();
    state.records.retain(|path, _| live.contains(path.as_str()));

    state.catalog_version = catalog_version.to_string();
    state.touch();
    state.save(root)?;

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
