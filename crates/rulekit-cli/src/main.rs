mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rulekit",
    about = "Sync a curated catalog of agent docs into a consumer repository",
    version,
    propagate_version = true
)]
struct Cli {
    /// Target repository root (default: auto-detect from .rulekit/ or .git/)
    #[arg(long, global = true, env = "RULEKIT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the full document catalog and write the initial sync state
    Init {
        /// Re-initialize even if sync state already exists (resets baselines)
        #[arg(long)]
        force: bool,
    },

    /// Sync catalog changes into the target repository (three-way)
    Update,

    /// Show the pending action for every catalog document (no writes)
    Status,

    /// Wire agent entry points (cursor, claude, codex) to the installed docs
    Install {
        /// Only link rule docs matching these patterns (`*` wildcards)
        #[arg(long)]
        include: Vec<String>,

        /// Skip rule docs matching these patterns (`*` wildcards)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Remove agent entry points and the sync baseline (docs are kept)
    Uninstall {
        /// Required: uninstall never prompts
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { force } => cmd::init::run(&root, force),
        Commands::Update => cmd::update::run(&root, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Install { include, exclude } => {
            cmd::install::run(&root, include, exclude, cli.json)
        }
        Commands::Uninstall { force } => cmd::uninstall::run(&root, force),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
