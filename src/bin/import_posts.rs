//! Copies crowdfunding campaign posts into the CMS.
//!
//! Reads the same configuration as the server. Already-imported posts are
//! skipped unless `--replace` is given.

use anyhow::{bail, Context, Result};
use clap::Parser;
use patron_gate::application::handlers::ImportPostsCommand;
use patron_gate::bootstrap::{build_importer, init_tracing};
use patron_gate::config::AppConfig;

/// Import crowdfunding posts into the CMS as drafts
#[derive(Parser, Debug)]
#[command(name = "import-posts", version, about)]
struct Cli {
    /// Delete and re-create posts imported by an earlier run
    #[arg(long)]
    replace: bool,

    /// Stop after this many source posts
    #[arg(long)]
    limit: Option<usize>,

    /// Concurrent image uploads (overrides import.concurrency)
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.server);
    if let Some(concurrency) = cli.concurrency {
        config.import.concurrency = concurrency;
    }
    config
        .validate_importer()
        .context("Invalid importer configuration")?;

    let importer = build_importer(&config).context("Failed to initialize importer")?;
    let report = importer
        .handle(ImportPostsCommand {
            replace: cli.replace,
            limit: cli.limit,
        })
        .await?;

    println!(
        "imported {}, replaced {}, skipped {}, failed {} (images: {} uploaded, {} reused, {} failed)",
        report.imported,
        report.replaced,
        report.skipped,
        report.failed,
        report.images_uploaded,
        report.images_reused,
        report.images_failed
    );

    if !report.is_clean() {
        bail!("Import finished with failures");
    }
    Ok(())
}
