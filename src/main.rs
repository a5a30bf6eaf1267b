//! Bazaar CLI Entry Point
//!
//! Resolves the database path from the command line or the profile
//! registry, opens the store, and hands control to the interactive
//! shell. Logs go to stderr so the menu stays readable.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bazaar::backend::sqlite::SqliteBackend;
use bazaar::prompt::ConsolePrompt;
use bazaar::{config, menu};

/// Bazaar - Role-Gated Marketplace Client
#[derive(Parser)]
#[command(name = "bazaar")]
#[command(about = "Menu-driven marketplace client with role-gated operations")]
#[command(version)]
struct Cli {
    /// Path to the database file (overrides any profile)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Named database profile from the profile registry
    #[arg(long)]
    profile: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let db_path = config::resolve_database(cli.db, cli.profile.as_deref())
        .context("could not resolve database path")?;
    let backend = SqliteBackend::open(&db_path)
        .with_context(|| format!("could not open database at {}", db_path.display()))?;
    backend.ensure_schema().context("could not apply schema")?;

    let mut prompt = ConsolePrompt::new();
    menu::run(&backend, &mut prompt)?;
    Ok(())
}
