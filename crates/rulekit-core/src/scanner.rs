use crate::catalog::Catalog;
use crate::error::Result;
use crate::hash::ContentHash;
use crate::paths;
use crate::state::SyncState;
use std::collections::BTreeMap;
use std::path::Path;

/// What currently sits at a catalog path in the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalContent {
    Absent,
    File { hash: ContentHash, content: Vec<u8> },
    /// A directory or other non-regular file occupies the path. Never
    /// hashed, never overwritten.
    NonRegular,
}

impl LocalContent {
    pub fn hash(&self) -> Option<&ContentHash> {
        match self {
            LocalContent::File { hash, .. } => Some(hash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalDoc {
    pub local: LocalContent,
    pub baseline: Option<ContentHash>,
}

/// Inspect the target repository for every path known to the catalog.
///
/// Read-only: produces the current local hash (or absent) plus the recorded
/// baseline, if any. An uninitialized repository (no prior state) scans as
/// all-absent baselines rather than failing.
pub fn scan(
    root: &Path,
    catalog: &Catalog,
    state: Option<&SyncState>,
) -> Result<BTreeMap<String, LocalDoc>> {
    let mut out = BTreeMap::new();
    for doc in catalog.docs() {
        let path = paths::doc_path(root, &doc.path);
        let local = match std::fs::symlink_metadata(&path) {
            // NotADirectory: a file sits where a parent directory should be;
            // the document itself is absent and the collision surfaces as a
            // per-document write failure if the engine orders a write.
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                LocalContent::Absent
            }
            Err(e) => return Err(e.into()),
            Ok(meta) if meta.is_file() => {
                let content = std::fs::read(&path)?;
                LocalContent::File {
                    hash: ContentHash::of(&content),
                    content,
                }
            }
            Ok(_) => LocalContent::NonRegular,
        };
        let baseline = state.and_then(|s| s.baseline(&doc.path)).copied();
        out.insert(doc.path.clone(), LocalDoc { local, baseline });
    }
    Ok(out)
}
