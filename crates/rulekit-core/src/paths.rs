use crate::error::{Result, RulekitError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const RULEKIT_DIR: &str = ".rulekit";
pub const CONFIG_FILE: &str = ".rulekit/config.yaml";
pub const STATE_FILE: &str = ".rulekit/state.yaml";

/// Root of the managed (catalog-owned) document tree in a target repository.
pub const GENERAL_DOCS_DIR: &str = "docs/general";
/// Consumer-owned docs skeleton; created on init, never synced.
pub const PROJECT_DOCS_DIR: &str = "docs/project";
/// Catalog subtree whose documents get wired into agent rule entry points.
pub const AGENT_RULES_SUBDIR: &str = "agent-rules";

pub const CURSOR_RULES_DIR: &str = ".cursor/rules";
pub const CLAUDE_MD: &str = "CLAUDE.md";
pub const AGENTS_MD: &str = "AGENTS.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn rulekit_dir(root: &Path) -> PathBuf {
    root.join(RULEKIT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn general_docs_dir(root: &Path) -> PathBuf {
    root.join(GENERAL_DOCS_DIR)
}

/// Absolute location of a catalog document inside the target repository.
pub fn doc_path(root: &Path, relative: &str) -> PathBuf {
    general_docs_dir(root).join(relative)
}

pub fn agent_rules_dir(root: &Path) -> PathBuf {
    general_docs_dir(root).join(AGENT_RULES_SUBDIR)
}

pub fn cursor_rules_dir(root: &Path) -> PathBuf {
    root.join(CURSOR_RULES_DIR)
}

pub fn claude_md_path(root: &Path) -> PathBuf {
    root.join(CLAUDE_MD)
}

pub fn agents_md_path(root: &Path) -> PathBuf {
    root.join(AGENTS_MD)
}

// ---------------------------------------------------------------------------
// Document path validation
// ---------------------------------------------------------------------------

static DOC_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn doc_path_re() -> &'static Regex {
    // Relative lowercase-kebab segments; a segment never starts with a dot,
    // so `..` and hidden files are rejected.
    DOC_PATH_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9.\-]*(/[a-z0-9][a-z0-9.\-]*)*$").unwrap()
    })
}

pub fn validate_doc_path(path: &str) -> Result<()> {
    if path.is_empty() || path.len() > 256 || !doc_path_re().is_match(path) {
        return Err(RulekitError::InvalidDocPath(path.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
