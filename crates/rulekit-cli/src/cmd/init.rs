use anyhow::Context;
use rulekit_core::{
    catalog::Catalog, config::Config, installer, io, paths, state::SyncState, RulekitError,
};
use std::path::Path;

use super::{EXIT_OK, EXIT_PENDING};

/// Version of the rulekit binary embedded at compile time.
pub const RULEKIT_BINARY_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run(root: &Path, force: bool) -> anyhow::Result<i32> {
    let catalog = Catalog::embedded().context("failed to load document catalog")?;

    if SyncState::exists(root) && !force {
        return Err(RulekitError::AlreadyInitialized(paths::STATE_FILE.to_string()).into());
    }

    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    println!("Initializing rulekit in: {}", root.display());

    // 1. Create the skeleton directories
    let dirs = [
        paths::RULEKIT_DIR,
        paths::GENERAL_DOCS_DIR,
        paths::PROJECT_DOCS_DIR,
    ];
    for dir in dirs {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }
    io::write_if_missing(
        &root.join(paths::PROJECT_DOCS_DIR).join("README.md"),
        PROJECT_DOCS_README.as_bytes(),
    )?;

    // 2. Write every catalog document and record its baseline
    let mut state = SyncState::new(catalog.version());
    for doc in catalog.docs() {
        let target = paths::doc_path(root, &doc.path);
        io::atomic_write(&target, &doc.content)
            .with_context(|| format!("failed to write {}", target.display()))?;
        state.set_baseline(&doc.path, doc.hash);
        println!("  created: {}/{}", paths::GENERAL_DOCS_DIR, doc.path);
    }

    // 3. Write config.yaml if missing, then stamp the binary version
    let config_path = paths::config_path(root);
    let mut config = if config_path.exists() {
        Config::load(root).context("failed to load config.yaml")?
    } else {
        let cfg = Config::new(&project_name);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };
    if let Some(previous) = stamp_rulekit_version(root, &mut config)? {
        println!(
            "  stamped: {} (rulekit_version {previous} -> {RULEKIT_BINARY_VERSION})",
            paths::CONFIG_FILE
        );
    }

    // 4. Write the initial sync state
    state.save(root).context("failed to write state.yaml")?;
    println!("  created: {}", paths::STATE_FILE);

    // 5. Wire agent entry points
    println!("\nWiring agent entry points:");
    let report = installer::install(root, &config).context("installer failed")?;
    for entry in &report.entries {
        println!("  {}: {}", entry.outcome.as_str(), entry.target);
    }

    println!("\nrulekit initialized with catalog {}.", catalog.version());
    println!("Next: rulekit status");

    if report.has_conflicts() {
        for entry in report.conflicts() {
            eprintln!("conflict: {} (foreign content, left untouched)", entry.target);
        }
        return Ok(EXIT_PENDING);
    }
    Ok(EXIT_OK)
}

/// Stamp the current binary version into `.rulekit/config.yaml`.
/// Idempotent — only writes if the stored version differs. Returns the
/// previous version when a stamp happened.
pub fn stamp_rulekit_version(root: &Path, config: &mut Config) -> anyhow::Result<Option<String>> {
    if config.rulekit_version.as_deref() == Some(RULEKIT_BINARY_VERSION) {
        return Ok(None);
    }
    let previous = config
        .rulekit_version
        .as_deref()
        .unwrap_or("none")
        .to_string();
    config.rulekit_version = Some(RULEKIT_BINARY_VERSION.to_string());
    config.save(root).context("failed to save config.yaml")?;
    Ok(Some(previous))
}

const PROJECT_DOCS_README: &str = r#"# Project Docs

Documents in this tree belong to this repository and are never touched by
`rulekit update`. Shared, catalog-managed docs live in `docs/general/`.
"#;
