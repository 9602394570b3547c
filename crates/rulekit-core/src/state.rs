use crate::error::{Result, RulekitError};
use crate::hash::ContentHash;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const STATE_SCHEMA_VERSION: u32 = 1;

/// Persisted sync baseline for one target repository.
///
/// `records` maps each catalog path to the content hash it had the last time
/// it was successfully synced — the common ancestor for the three-way
/// comparison. A `BTreeMap` keeps the serialized mapping stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default = "default_version")]
    pub version: u32,
    pub catalog_version: String,
    #[serde(default)]
    pub records: BTreeMap<String, ContentHash>,
    pub last_synced: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl SyncState {
    pub fn new(catalog_version: impl Into<String>) -> Self {
        Self {
            version: STATE_SCHEMA_VERSION,
            catalog_version: catalog_version.into(),
            records: BTreeMap::new(),
            last_synced: Utc::now(),
        }
    }

    pub fn exists(root: &Path) -> bool {
        paths::state_path(root).exists()
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the state file, distinguishing "never initialized" from "corrupt".
    ///
    /// A corrupt state file refuses to load rather than degrading to an empty
    /// baseline: an empty baseline would mass re-Create and clobber local
    /// edits.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::state_path(root);
        if !path.exists() {
            return Err(RulekitError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let state: SyncState =
            serde_yaml::from_str(&data).map_err(|e| RulekitError::StateCorrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        crate::migrations::migrate_state(state)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::state_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Baseline access
    // ---------------------------------------------------------------------------

    pub fn baseline(&self, path: &str) -> Option<&ContentHash> {
        self.records.get(path)
    }

    pub fn set_baseline(&mut self, path: &str, hash: ContentHash) {
        self.records.insert(path.to_string(), hash);
    }

    pub fn touch(&mut self) {
        self.last_synced = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
