use crate::catalog::Catalog;
use crate::hash::ContentHash;
use crate::scanner::{LocalContent, LocalDoc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Skip,
    Conflict,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Skip => "skip",
            Action::Conflict => "conflict",
        }
    }

    /// Anything other than `Skip` means the target repository is not in sync.
    pub fn is_pending(self) -> bool {
        self != Action::Skip
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify one document from its hash triple. Pure: no I/O, exhaustively
/// unit-testable.
///
/// A local edit always wins over an upstream change: when both sides diverged
/// from the baseline the result is `Conflict`, never a silent overwrite. The
/// one exception is convergence — both sides changed to identical content —
/// which is a `Skip` (writing would be a no-op and the conflict could never
/// be resolved by editing).
///
/// A present file with no baseline record was not put there by a prior sync;
/// it is treated as locally modified (conflict-eligible) unless it already
/// matches upstream.
pub fn classify(
    upstream: &ContentHash,
    baseline: Option<&ContentHash>,
    local: Option<&ContentHash>,
) -> Action {
    let Some(local) = local else {
        return Action::Create;
    };
    let Some(baseline) = baseline else {
        return if local == upstream {
            Action::Skip
        } else {
            Action::Conflict
        };
    };

    let upstream_changed = upstream != baseline;
    let local_changed = local != baseline;
    match (upstream_changed, local_changed) {
        (false, _) => Action::Skip,
        (true, false) => Action::Update,
        (true, true) if local == upstream => Action::Skip,
        (true, true) => Action::Conflict,
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Engine output for one document. Carries both sides of a conflict so a
/// caller can reconcile with a standard three-way merge; the engine itself
/// never touches the filesystem.
#[derive(Debug, Clone)]
pub struct DocPlan<'a> {
    pub path: &'a str,
    pub action: Action,
    pub upstream_hash: ContentHash,
    pub upstream: &'a [u8],
    pub local_hash: Option<ContentHash>,
    pub local: Option<&'a [u8]>,
}

/// Classify every catalog document against the scan results.
pub fn plan<'a>(catalog: &'a Catalog, scanned: &'a BTreeMap<String, LocalDoc>) -> Vec<DocPlan<'a>> {
    catalog
        .docs()
        .iter()
        .map(|doc| {
            let entry = scanned.get(&doc.path);
            let (action, local_hash, local) = match entry.map(|e| &e.local) {
                None | Some(LocalContent::Absent) => {
                    (Action::Create, None, None)
                }
                // Something non-overwritable sits at the path.
                Some(LocalContent::NonRegular) => (Action::Conflict, None, None),
                Some(LocalContent::File { hash, content }) => {
                    let baseline = entry.and_then(|e| e.baseline.as_ref());
                    (
                        classify(&doc.hash, baseline, Some(hash)),
                        Some(*hash),
                        Some(content.as_slice()),
                    )
                }
            };
            DocPlan {
                path: &doc.path,
                action,
                upstream_hash: doc.hash,
                upstream: &doc.content,
                local_hash,
                local,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
