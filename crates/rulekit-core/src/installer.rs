use crate::config::{AgentTool, Config, CursorConfig};
use crate::error::Result;
use crate::io;
use crate::paths;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Marker that delimits the managed rulekit section in pointer files.
pub const MARKER_START: &str = "<!-- rulekit:start -->";
/// Closing marker for the managed rulekit section.
pub const MARKER_END: &str = "<!-- rulekit:end -->";

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    Created,
    Updated,
    Unchanged,
    /// The target location holds content this installer did not put there.
    /// Left untouched.
    Conflict,
}

impl InstallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallOutcome::Created => "created",
            InstallOutcome::Updated => "updated",
            InstallOutcome::Unchanged => "unchanged",
            InstallOutcome::Conflict => "conflict",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstallEntry {
    pub target: String,
    pub outcome: InstallOutcome,
}

#[derive(Debug, Default, Serialize)]
pub struct InstallReport {
    pub entries: Vec<InstallEntry>,
}

impl InstallReport {
    fn record(&mut self, target: impl Into<String>, outcome: InstallOutcome) {
        self.entries.push(InstallEntry {
            target: target.into(),
            outcome,
        });
    }

    pub fn has_conflicts(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.outcome == InstallOutcome::Conflict)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &InstallEntry> {
        self.entries
            .iter()
            .filter(|e| e.outcome == InstallOutcome::Conflict)
    }
}

// ---------------------------------------------------------------------------
// Install
// ---------------------------------------------------------------------------

/// Wire every configured agent entry point to the installed document tree.
///
/// Idempotent: a second run leaves every entry point byte-identical and
/// reports it `Unchanged`. Foreign content at an entry point is never
/// overwritten — it is reported as a `Conflict` and skipped.
pub fn install(root: &Path, config: &Config) -> Result<InstallReport> {
    let mut report = InstallReport::default();
    for tool in &config.agents {
        match tool {
            AgentTool::Cursor => install_cursor_rules(root, &config.cursor, &mut report)?,
            AgentTool::Claude => install_pointer_file(
                &paths::claude_md_path(root),
                paths::CLAUDE_MD,
                &config.project.name,
                &mut report,
            )?,
            AgentTool::Codex => install_pointer_file(
                &paths::agents_md_path(root),
                paths::AGENTS_MD,
                &config.project.name,
                &mut report,
            )?,
        }
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Cursor: symlinked rule files
// ---------------------------------------------------------------------------

fn install_cursor_rules(
    root: &Path,
    cursor: &CursorConfig,
    report: &mut InstallReport,
) -> Result<()> {
    let rules_dir = paths::agent_rules_dir(root);
    if !rules_dir.is_dir() {
        warn!(dir = %rules_dir.display(), "agent rules directory missing; nothing to link");
        return Ok(());
    }

    let cursor_dir = paths::cursor_rules_dir(root);
    io::ensure_dir(&cursor_dir)?;

    let mut names: Vec<String> = std::fs::read_dir(&rules_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "md"))
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| rule_selected(cursor, name))
        .collect();
    names.sort();

    for name in &names {
        let stem = name.trim_end_matches(".md");
        let link = cursor_dir.join(format!("{stem}.mdc"));
        // Relative so the repository can be moved or checked out anywhere.
        let target = PathBuf::from("../..")
            .join(paths::GENERAL_DOCS_DIR)
            .join(paths::AGENT_RULES_SUBDIR)
            .join(name);
        let display = format!(".cursor/rules/{stem}.mdc");

        match std::fs::symlink_metadata(&link) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                io::symlink(&target, &link)?;
                report.record(display, InstallOutcome::Created);
            }
            Ok(meta) if meta.file_type().is_symlink() => {
                if std::fs::read_link(&link)? == target {
                    report.record(display, InstallOutcome::Unchanged);
                } else {
                    std::fs::remove_file(&link)?;
                    io::symlink(&target, &link)?;
                    report.record(display, InstallOutcome::Updated);
                }
            }
            Ok(_) => report.record(display, InstallOutcome::Conflict),
            Err(e) => return Err(e.into()),
        }
    }

    remove_dangling_rule_links(&cursor_dir)?;
    Ok(())
}

fn rule_selected(cursor: &CursorConfig, name: &str) -> bool {
    if !cursor.include.is_empty() && !cursor.include.iter().any(|p| wildcard_match(p, name)) {
        return false;
    }
    !cursor.exclude.iter().any(|p| wildcard_match(p, name))
}

/// `*` matches any run of characters; everything else is literal.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let re = format!(
        "^{}$",
        pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*")
    );
    Regex::new(&re).map(|r| r.is_match(name)).unwrap_or(false)
}

fn is_rule_link(target: &Path) -> bool {
    target
        .to_str()
        .is_some_and(|t| t.contains(paths::AGENT_RULES_SUBDIR))
}

/// Drop symlinks left behind by a prior run whose rule document no longer
/// exists (renamed or removed upstream). Regular files are never touched.
fn remove_dangling_rule_links(cursor_dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(cursor_dir)? {
        let entry = entry?;
        let link = entry.path();
        if !entry.file_type()?.is_symlink() {
            continue;
        }
        let target = std::fs::read_link(&link)?;
        if is_rule_link(&target) && !link.parent().unwrap_or(cursor_dir).join(&target).exists() {
            debug!(link = %link.display(), "removing dangling rule symlink");
            std::fs::remove_file(&link)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Claude / Codex: marker-managed pointer section
// ---------------------------------------------------------------------------

fn install_pointer_file(
    path: &Path,
    display: &str,
    project_name: &str,
    report: &mut InstallReport,
) -> Result<()> {
    let section = build_marked_section(project_name);

    if !path.exists() {
        // The fresh file is entirely managed content, so uninstall can
        // delete it cleanly.
        io::atomic_write(path, format!("{section}\n").as_bytes())?;
        report.record(display, InstallOutcome::Created);
        return Ok(());
    }

    let existing = std::fs::read_to_string(path)?;
    if !existing.contains(MARKER_START) {
        // Foreign content: not ours to rewrite.
        report.record(display, InstallOutcome::Conflict);
        return Ok(());
    }

    match io::splice_between_markers(&existing, MARKER_START, MARKER_END, &section) {
        Some(updated) if updated == existing => report.record(display, InstallOutcome::Unchanged),
        Some(updated) => {
            io::atomic_write(path, updated.as_bytes())?;
            report.record(display, InstallOutcome::Updated);
        }
        // Start marker without end marker: unmanageable, leave it alone.
        None => report.record(display, InstallOutcome::Conflict),
    }
    Ok(())
}

fn build_marked_section(project_name: &str) -> String {
    format!(
        "{MARKER_START}\n\
         ## Agent docs\n\n\
         Shared agent rules and prompt shortcuts for {project_name} are managed by\n\
         `rulekit` and live under `docs/general/`:\n\n\
         - `docs/general/guidelines/` — read `development.md` first\n\
         - `docs/general/agent-rules/` — rules that apply to every change\n\
         - `docs/general/shortcuts/` — step-by-step playbooks for common tasks\n\n\
         Edit these files freely; `rulekit update` preserves local edits and\n\
         surfaces conflicting upstream changes instead of overwriting them.\n\
         Project-specific docs belong in `docs/project/`.\n\
         {MARKER_END}"
    )
}

// ---------------------------------------------------------------------------
// Uninstall
// ---------------------------------------------------------------------------

/// Remove everything the installer and sync executor own: pointer sections,
/// rule symlinks, and the sync baseline. The installed document tree and the
/// config file are preserved.
pub fn uninstall(root: &Path, config: &Config) -> Result<Vec<String>> {
    let mut removed = Vec::new();

    for tool in &config.agents {
        match tool {
            AgentTool::Cursor => remove_rule_links(root, &mut removed)?,
            AgentTool::Claude => {
                remove_marker_section(&paths::claude_md_path(root), paths::CLAUDE_MD, &mut removed)?
            }
            AgentTool::Codex => {
                remove_marker_section(&paths::agents_md_path(root), paths::AGENTS_MD, &mut removed)?
            }
        }
    }

    let state_path = paths::state_path(root);
    if state_path.exists() {
        std::fs::remove_file(&state_path)?;
        removed.push(paths::STATE_FILE.to_string());
    }

    Ok(removed)
}

fn remove_rule_links(root: &Path, removed: &mut Vec<String>) -> Result<()> {
    let cursor_dir = paths::cursor_rules_dir(root);
    if !cursor_dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(&cursor_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_symlink() {
            continue;
        }
        let link = entry.path();
        if is_rule_link(&std::fs::read_link(&link)?) {
            std::fs::remove_file(&link)?;
            removed.push(format!(
                ".cursor/rules/{}",
                entry.file_name().to_string_lossy()
            ));
        }
    }
    Ok(())
}

/// Cut the managed section out of a pointer file, preserving any user content
/// around it. Deletes the file when nothing but whitespace remains.
fn remove_marker_section(path: &Path, display: &str, removed: &mut Vec<String>) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)?;
    let Some(spliced) = io::splice_between_markers(&content, MARKER_START, MARKER_END, "") else {
        return Ok(());
    };
    if spliced.trim().is_empty() {
        std::fs::remove_file(path)?;
    } else {
        let cleaned = format!("{}\n", spliced.trim_matches('\n'));
        io::atomic_write(path, cleaned.as_bytes())?;
    }
    removed.push(display.to_string());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
