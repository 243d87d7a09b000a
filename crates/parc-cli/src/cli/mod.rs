//! CLI for the parc post archiver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use parc_core::config;
use std::path::PathBuf;

use commands::{run_archive, run_export_links, run_status, ArchiveOptions};

/// Top-level CLI for the parc post archiver.
#[derive(Debug, Parser)]
#[command(name = "parc", version)]
#[command(about = "parc: incremental archiver for subscription-platform posts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Archive the posts of one or more creators.
    Archive {
        /// Creator names or URLs (https://boosty.to/NAME).
        #[arg(required = true)]
        users: Vec<String>,

        /// Output directory; each creator gets a sub-directory.
        #[arg(short = 'O', long = "output", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Download every asset again, ignoring what is already archived.
        #[arg(short = 'F', long)]
        force_redownload: bool,

        /// Bearer token (overrides token_path from config.toml).
        #[arg(short = 'T', long, value_name = "TOKEN")]
        token: Option<String>,

        /// Netscape cookies.txt (overrides cookies_path from config.toml).
        #[arg(short = 'C', long, value_name = "FILE")]
        cookies: Option<PathBuf>,

        /// Track downloads in the SQLite ledger instead of probing the output directory.
        #[arg(long)]
        use_db: bool,

        /// SQLite ledger location (implies --use-db).
        #[arg(long, value_name = "PATH")]
        db_path: Option<PathBuf>,

        /// Concurrent transfers per post.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },

    /// Regenerate a creator's link export from the ledger, without network access.
    ExportLinks {
        /// Creator name.
        user: String,

        /// Output directory the creator was archived into.
        #[arg(short = 'O', long = "output", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Read links from the SQLite ledger.
        #[arg(long)]
        use_db: bool,

        /// SQLite ledger location (implies --use-db).
        #[arg(long, value_name = "PATH")]
        db_path: Option<PathBuf>,
    },

    /// Show per-creator download and link counts from the SQLite ledger.
    Status {
        /// SQLite ledger location.
        #[arg(long, value_name = "PATH")]
        db_path: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Archive {
                users,
                output_dir,
                force_redownload,
                token,
                cookies,
                use_db,
                db_path,
                workers,
            } => {
                let opts = ArchiveOptions {
                    output_dir: resolve_output(output_dir)?,
                    force_redownload,
                    token,
                    cookies,
                    use_db: use_db || db_path.is_some(),
                    db_path,
                    workers,
                };
                run_archive(&cfg, &users, opts).await?;
            }
            CliCommand::ExportLinks {
                user,
                output_dir,
                use_db,
                db_path,
            } => {
                let output_dir = resolve_output(output_dir)?;
                let use_db = use_db || db_path.is_some() || cfg.backend == Some(config::BackendKind::Database);
                let db_path = db_path.or_else(|| cfg.db_path.clone());
                run_export_links(&user, &output_dir, use_db, db_path.as_deref()).await?;
            }
            CliCommand::Status { db_path } => {
                run_status(db_path.or_else(|| cfg.db_path.clone()).as_deref()).await?;
            }
        }

        Ok(())
    }
}

fn resolve_output(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(d) => Ok(d),
        None => Ok(std::env::current_dir()?),
    }
}
