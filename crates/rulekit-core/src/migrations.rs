use crate::error::{Result, RulekitError};
use crate::state::{SyncState, STATE_SCHEMA_VERSION};

/// Run any pending schema migrations on a loaded [`SyncState`].
///
/// Currently schema v1 has no migrations. When the state schema changes in
/// ways that require data transforms, add a match arm here:
///
/// ```rust,ignore
/// match state.version {
///     1 => migrate_v1_to_v2(state),
///     _ => ...,
/// }
/// ```
///
/// A state file written by a *newer* rulekit is refused outright — guessing at
/// an unknown schema risks discarding baselines.
pub fn migrate_state(state: SyncState) -> Result<SyncState> {
    match state.version {
        STATE_SCHEMA_VERSION => Ok(state),
        v => Err(RulekitError::UnsupportedStateVersion(v)),
    }
}
