#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use rulekit_core::catalog::Catalog;
use rulekit_core::hash::ContentHash;
use rulekit_core::state::SyncState;
use std::path::PathBuf;
use tempfile::TempDir;

const DOC_A: &str = "agent-rules/general-coding-guidelines.md";
const DOC_B: &str = "agent-rules/general-tdd-guidelines.md";

fn rulekit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rulekit").unwrap();
    cmd.current_dir(dir.path()).env("RULEKIT_ROOT", dir.path());
    cmd
}

fn init_repo(dir: &TempDir) {
    rulekit(dir).arg("init").assert().success();
}

fn doc_path(dir: &TempDir, rel: &str) -> PathBuf {
    dir.path().join("docs/general").join(rel)
}

fn upstream_content(rel: &str) -> Vec<u8> {
    Catalog::embedded().unwrap().get(rel).unwrap().content.clone()
}

/// Rewrite a doc and its baseline to an older revision, so the embedded
/// catalog looks like a freshly shipped upstream change.
fn simulate_upstream_change(dir: &TempDir, rel: &str) {
    let old = b"old upstream revision\n";
    std::fs::write(doc_path(dir, rel), old).unwrap();
    let mut state = SyncState::load(dir.path()).unwrap();
    state.set_baseline(rel, ContentHash::of(old));
    state.save(dir.path()).unwrap();
}

// ---------------------------------------------------------------------------
// rulekit init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_docs_state_and_entry_points() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    assert!(dir.path().join(".rulekit/state.yaml").exists());
    assert!(dir.path().join(".rulekit/config.yaml").exists());
    assert!(doc_path(&dir, DOC_A).exists());
    assert!(dir.path().join("docs/project/README.md").exists());
    assert!(dir.path().join("CLAUDE.md").exists());
    assert!(dir.path().join("AGENTS.md").exists());
}

#[cfg(unix)]
#[test]
fn init_symlinks_cursor_rules() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    let link = dir
        .path()
        .join(".cursor/rules/general-coding-guidelines.mdc");
    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert!(std::fs::read_link(&link).unwrap().is_relative());
}

#[test]
fn init_twice_fails_without_force() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    rulekit(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    rulekit(&dir).args(["init", "--force"]).assert().success();
}

#[test]
fn init_then_status_reports_in_sync() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    rulekit(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Everything in sync"));
}

// ---------------------------------------------------------------------------
// rulekit status
// ---------------------------------------------------------------------------

#[test]
fn status_before_init_fails_with_hint() {
    let dir = TempDir::new().unwrap();
    rulekit(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("rulekit init"));
}

#[test]
fn status_reports_pending_create_for_missing_doc() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    std::fs::remove_file(doc_path(&dir, DOC_A)).unwrap();

    rulekit(&dir)
        .arg("status")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("create"));
}

#[test]
fn status_json_lists_documents() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    let output = rulekit(&dir).args(["status", "--json"]).output().unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["pending"], 0);
    assert!(parsed["documents"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["path"] == DOC_A));
}

// ---------------------------------------------------------------------------
// rulekit update
// ---------------------------------------------------------------------------

#[test]
fn update_after_init_is_all_skip() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    rulekit(&dir)
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 created, 0 updated"));
}

#[test]
fn update_before_init_fails() {
    let dir = TempDir::new().unwrap();
    rulekit(&dir)
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn update_preserves_local_edit_when_upstream_unchanged() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    std::fs::write(doc_path(&dir, DOC_A), b"my local edit\n").unwrap();

    rulekit(&dir).arg("update").assert().success();
    assert_eq!(
        std::fs::read(doc_path(&dir, DOC_A)).unwrap(),
        b"my local edit\n"
    );
}

#[test]
fn update_applies_upstream_change_to_clean_doc() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    simulate_upstream_change(&dir, DOC_A);

    rulekit(&dir)
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains(DOC_A));
    assert_eq!(std::fs::read(doc_path(&dir, DOC_A)).unwrap(), upstream_content(DOC_A));
}

#[test]
fn update_recreates_deleted_doc() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    std::fs::remove_file(doc_path(&dir, DOC_B)).unwrap();

    rulekit(&dir).arg("update").assert().success();
    assert_eq!(std::fs::read(doc_path(&dir, DOC_B)).unwrap(), upstream_content(DOC_B));
}

#[test]
fn conflict_accounting() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    // A: upstream changed AND locally edited — conflict.
    simulate_upstream_change(&dir, DOC_A);
    std::fs::write(doc_path(&dir, DOC_A), b"my local edit\n").unwrap();
    // B: upstream changed only — safe update.
    simulate_upstream_change(&dir, DOC_B);

    let output = rulekit(&dir).arg("update").output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("conflict:").count(), 1);
    assert!(stderr.contains(DOC_A));

    assert_eq!(
        std::fs::read(doc_path(&dir, DOC_A)).unwrap(),
        b"my local edit\n"
    );
    assert_eq!(std::fs::read(doc_path(&dir, DOC_B)).unwrap(), upstream_content(DOC_B));

    // The conflict persists on the next run; nothing was silently resolved.
    rulekit(&dir).arg("update").assert().code(2);
}

#[test]
fn corrupt_state_refuses_update_and_force_init_recovers() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);
    std::fs::write(dir.path().join(".rulekit/state.yaml"), "{not yaml: [").unwrap();

    rulekit(&dir)
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));

    rulekit(&dir).args(["init", "--force"]).assert().success();
    rulekit(&dir).arg("status").assert().success();
}

// ---------------------------------------------------------------------------
// rulekit install / uninstall
// ---------------------------------------------------------------------------

#[test]
fn install_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    rulekit(&dir).arg("install").assert().success();
    let before = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
    rulekit(&dir).arg("install").assert().success();
    let after = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn install_reports_foreign_pointer_file() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    // Replace the managed file with hand-written content (no markers).
    std::fs::write(dir.path().join("CLAUDE.md"), "# Mine\n").unwrap();

    rulekit(&dir)
        .arg("install")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("CLAUDE.md"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap(),
        "# Mine\n"
    );
}

#[test]
fn uninstall_requires_force() {
    let dir = TempDir::new().unwrap();
    init_repo(&dir);

    rulekit(&dir).arg("uninstall").assert().failure();

    rulekit(&dir)
        .args(["uninstall", "--force"])
        .assert()
        .success();
    assert!(!dir.path().join(".rulekit/state.yaml").exists());
    // Docs survive an uninstall.
    assert!(doc_path(&dir, DOC_A).exists());
}
