use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use collector::{ActivityFetcher, BatchReport, HttpActivityClient};
use common::config::{AppConfig, FailurePolicy};
use common::logging;
use tracing::info;

/// Fetch and normalize the pull requests, issues and commits of one repository.
#[derive(Debug, Parser)]
#[command(name = "collector", version)]
struct Args {
    /// Repository owner (GitHub login).
    owner: String,
    /// Repository name or GitHub URL.
    repo: String,
    /// Include the raw backend payloads in the output.
    #[arg(long)]
    raw: bool,
    /// Report each activity kind separately instead of failing the whole batch.
    #[arg(long)]
    independent: bool,
    /// Directory holding `config/default` and `config/local`.
    #[arg(long, default_value = ".")]
    config_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let args = Args::parse();
    let config = AppConfig::load_from_path(&args.config_dir)?;

    let client = Arc::new(HttpActivityClient::from_config(&config.backend)?);
    let fetcher = ActivityFetcher::with_shapes(client, &config.shapes);

    let policy = if args.independent {
        FailurePolicy::Independent
    } else {
        config.fetch.policy
    };
    info!(owner = %args.owner, repo = %args.repo, ?policy, "fetching activity");

    let report = match policy {
        FailurePolicy::FailFast => {
            let batch = fetcher.fetch_for(&args.owner, &args.repo).await?;
            BatchReport::from_batch(batch, args.raw)
        }
        FailurePolicy::Independent => {
            let settled = fetcher.fetch_settled_for(&args.owner, &args.repo).await?;
            BatchReport::from_settled(settled, args.raw)
        }
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.failed_kinds() == report.kinds().len() {
        return Err(anyhow!("every activity request failed"));
    }
    Ok(())
}
