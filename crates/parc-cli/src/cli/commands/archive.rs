//! `parc archive` – archive one or more creators.

use anyhow::{Context, Result};
use parc_core::auth::Credentials;
use parc_core::config::{BackendKind, ParcConfig, RunConfig};
use parc_core::ledger::LinkEntry;
use parc_core::orchestrator::{ArchiveEvent, Archiver, RunSummary, UserSummary};
use parc_core::transport::{CurlTransport, Transport, TransportOptions};
use std::path::PathBuf;
use std::sync::Arc;

/// Flags of `parc archive` after defaults are applied.
#[derive(Debug)]
pub struct ArchiveOptions {
    pub output_dir: PathBuf,
    pub force_redownload: bool,
    pub token: Option<String>,
    pub cookies: Option<PathBuf>,
    pub use_db: bool,
    pub db_path: Option<PathBuf>,
    pub workers: Option<usize>,
}

pub async fn run_archive(cfg: &ParcConfig, users: &[String], opts: ArchiveOptions) -> Result<()> {
    let cookies_path = match opts.cookies {
        Some(p) => p,
        None => cfg.cookies_path()?,
    };
    let credentials = Credentials::load(opts.token, &cfg.token_path()?, &cookies_path)?;

    let mut run = RunConfig::new(cfg, opts.output_dir, credentials);
    run.force_redownload = opts.force_redownload;
    if opts.use_db {
        run.backend = BackendKind::Database;
    }
    if opts.db_path.is_some() {
        run.db_path = opts.db_path;
    }
    if let Some(n) = opts.workers {
        run.workers = n.max(1);
    }
    std::fs::create_dir_all(&run.output_dir)
        .with_context(|| format!("create output dir {}", run.output_dir.display()))?;
    tracing::info!(
        output = %run.output_dir.display(),
        backend = ?run.backend,
        force = run.force_redownload,
        "starting archive run"
    );

    let transport: Arc<dyn Transport> = Arc::new(CurlTransport::new(TransportOptions {
        connect_timeout: run.connect_timeout,
        request_timeout: run.request_timeout,
    }));

    let (tx, mut rx) = tokio::sync::mpsc::channel::<ArchiveEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(&event);
        }
    });

    let archiver = Archiver::new(Arc::new(run), transport).await?.with_events(tx);
    let result = archiver.archive_users(users).await;
    drop(archiver);
    let _ = printer.await;

    let summary = result?;
    print_totals(&summary);
    if !summary.is_clean() {
        tracing::warn!("run finished with per-asset or per-user failures");
    }
    Ok(())
}

fn print_event(event: &ArchiveEvent) {
    match event {
        ArchiveEvent::UserStarted { user } => println!("==> {}", user),
        ArchiveEvent::PostStarted {
            post_id,
            title,
            post_url,
            has_access,
            assets,
        } => {
            let access = if *has_access { "" } else { "  [no access]" };
            println!("\n[{}] {}  ({} assets){}", post_id, title, assets, access);
            println!("    {}", post_url);
        }
        ArchiveEvent::AssetSkipped { identity, .. } => println!("    skip      {}", identity),
        ArchiveEvent::AssetUnavailable {
            kind,
            index,
            reason,
            ..
        } => println!("    missing   {}#{} ({})", kind, index, reason),
        ArchiveEvent::AssetDownloaded { identity, bytes, .. } => {
            println!("    saved     {}  {}", identity, human_bytes(*bytes))
        }
        ArchiveEvent::AssetFailed { identity, error } => {
            println!("    FAILED    {}: {}", identity, error)
        }
        ArchiveEvent::UserFinished { summary, links } => {
            print_links(links);
            print_user(summary);
        }
    }
}

fn print_links(links: &[LinkEntry]) {
    if links.is_empty() {
        return;
    }
    println!("\n{:<10} {:<48} {}", "POST", "POST URL", "LINK");
    for l in links {
        println!("{:<10} {:<48} {}", l.post_id, l.post_url, l.url);
    }
}

fn print_user(s: &UserSummary) {
    println!(
        "\n{}: {} posts ({} without access), {} saved ({}), {} skipped, {} unavailable, {} failed, {} links ({} new)",
        s.user,
        s.posts,
        s.posts_no_access,
        s.downloaded,
        human_bytes(s.bytes),
        s.skipped,
        s.unavailable,
        s.failed,
        s.links_total,
        s.links_new
    );
    if let Some(err) = &s.error {
        println!("    error: {}", err);
    }
}

fn print_totals(summary: &RunSummary) {
    if summary.users.len() < 2 {
        return;
    }
    let t = summary.totals();
    println!(
        "\nTotal: {} users, {} saved ({}), {} skipped, {} unavailable, {} failed",
        summary.users.len(),
        t.downloaded,
        human_bytes(t.bytes),
        t.skipped,
        t.unavailable,
        t.failed
    );
}

pub(crate) fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.1} {}", v, UNITS[unit])
    }
}
