//! # chunkvault CLI - Deduplicating backups
//!
//! Command-line front end for the chunkvault backup engine.
//!
//! ## Usage
//! ```bash
//! # Initialize a repository
//! chunkvault init ./vault
//!
//! # Back up a directory
//! chunkvault backup ./documents ./vault
//!
//! # Restore everything into a directory
//! chunkvault restore ./vault ./restored
//!
//! # Restore one file by its original path
//! chunkvault restore ./vault ./restored --path ./documents/report.txt
//!
//! # Show repository statistics
//! chunkvault stats ./vault
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use chunkvault::{Orchestrator, Repository, Result};

/// chunkvault - deduplicating backups with content-defined chunking
#[derive(Parser)]
#[command(name = "chunkvault")]
#[command(version)]
#[command(about = "Deduplicating backup tool - chunk, fingerprint, store once")]
#[command(long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new repository
    Init {
        /// Path to create the repository at
        repo_path: PathBuf,
    },

    /// Back up a source directory into a repository
    #[command(alias = "bk")]
    Backup {
        /// Source directory to back up
        source_path: PathBuf,

        /// Path of the repository
        repo_path: PathBuf,
    },

    /// Restore backed-up files into a destination directory
    #[command(alias = "rs")]
    Restore {
        /// Path of the repository
        repo_path: PathBuf,

        /// Destination directory for restored files
        dest_dir: PathBuf,

        /// Restore only the record for this original path
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Show repository statistics
    Stats {
        /// Path of the repository
        repo_path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    // Run command
    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main command runner
fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { repo_path } => cmd_init(repo_path),
        Commands::Backup {
            source_path,
            repo_path,
        } => cmd_backup(source_path, repo_path),
        Commands::Restore {
            repo_path,
            dest_dir,
            path,
        } => cmd_restore(repo_path, dest_dir, path),
        Commands::Stats { repo_path } => cmd_stats(repo_path),
    }
}

/// Initialize a repository
fn cmd_init(repo_path: PathBuf) -> Result<()> {
    let repo = Repository::new(repo_path.clone());
    repo.init()?;

    println!(
        "{} Initialized empty repository at {}",
        "✓".green().bold(),
        repo_path.display().to_string().cyan()
    );
    Ok(())
}

/// Back up a source tree into a repository
fn cmd_backup(source_path: PathBuf, repo_path: PathBuf) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let mut orchestrator = Orchestrator::new(repo);

    println!("{}", "Starting backup...".blue().bold());
    let summary = orchestrator.run_backup(&source_path)?;

    println!("{} Backup complete", "✓".green().bold());
    println!("  Files processed:    {}", summary.files_processed);
    println!("  Files unchanged:    {}", summary.files_skipped);
    if summary.files_failed > 0 {
        println!(
            "  Files failed:       {}",
            summary.files_failed.to_string().red()
        );
    }
    println!("  New chunks stored:  {}", summary.chunks_stored);
    println!("  Chunks deduplicated: {}", summary.chunks_deduplicated);
    println!("  Bytes read:         {}", summary.bytes_read);
    Ok(())
}

/// Restore files from a repository
fn cmd_restore(repo_path: PathBuf, dest_dir: PathBuf, path: Option<PathBuf>) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let mut orchestrator = Orchestrator::new(repo);

    println!("{}", "Starting restore...".blue().bold());
    let summary = orchestrator.run_restore(&dest_dir, path.as_deref())?;

    if summary.files_restored == 0 && summary.files_failed == 0 {
        println!("{} Nothing to restore", "!".yellow().bold());
        return Ok(());
    }

    println!("{} Restore complete", "✓".green().bold());
    println!("  Files restored: {}", summary.files_restored);
    if summary.files_failed > 0 {
        println!(
            "  Files failed:   {}",
            summary.files_failed.to_string().red()
        );
    }
    println!("  Bytes written:  {}", summary.bytes_written);
    Ok(())
}

/// Show repository statistics
fn cmd_stats(repo_path: PathBuf) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let stats = repo.stats()?;

    println!("{}", "Repository statistics".blue().bold());
    println!("  Objects:       {}", stats.object_count);
    println!("  Object bytes:  {}", stats.total_object_bytes);
    println!("  File records:  {}", stats.record_count);
    Ok(())
}
