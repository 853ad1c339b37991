use std::sync::Arc;

use anyhow::Result;
use api::{build_router, ApiState};
use axum::Router;
use collector::{ActivityFetcher, HttpActivityClient};
use common::{config::AppConfig, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;
    let client = Arc::new(HttpActivityClient::from_config(&config.backend)?);
    let fetcher = Arc::new(ActivityFetcher::with_shapes(client, &config.shapes));
    let metrics_path: &'static str =
        Box::leak(config.observability.metrics_path.clone().into_boxed_str());
    let state = Arc::new(ApiState {
        fetcher,
        policy: config.fetch.policy,
        metrics_path,
    });
    let app: Router = build_router(state);

    let addr: std::net::SocketAddr = config.api.bind.parse()?;
    info!(backend = %config.backend.base_url, policy = ?config.fetch.policy, "api listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
