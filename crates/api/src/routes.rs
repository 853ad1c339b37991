use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use collector::{ActivityFetcher, BatchReport};
use common::config::FailurePolicy;
use normalizer::{ActivityKind, RepositoryIdentity};
use prometheus::Encoder;
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{ActivityQuery, IdentityDto};
use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct ApiState {
    pub fetcher: Arc<ActivityFetcher>,
    pub policy: FailurePolicy,
    pub metrics_path: &'static str,
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let metrics_path: &'static str = state.metrics_path;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/activity", get(get_activity))
        .route("/activity/identity", get(get_identity))
        .route(metrics_path, get(metrics))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip(state))]
async fn get_activity(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<BatchReport>> {
    let policy = query.policy.unwrap_or(state.policy);
    let report = match policy {
        FailurePolicy::FailFast => {
            let batch = state
                .fetcher
                .fetch_for(query.owner(), query.raw_repo())
                .await?;
            BatchReport::from_batch(batch, query.raw)
        }
        FailurePolicy::Independent => {
            let settled = state
                .fetcher
                .fetch_settled_for(query.owner(), query.raw_repo())
                .await?;
            // nothing to show when every kind failed
            if settled.failures().count() == ActivityKind::ALL.len() {
                let message = settled
                    .failures()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(ApiError::Upstream(message));
            }
            BatchReport::from_settled(settled, query.raw)
        }
    };
    info!(
        owner = %report.owner,
        repo = %report.repo,
        failed = report.failed_kinds(),
        "activity served"
    );
    Ok(Json(report))
}

#[instrument]
async fn get_identity(Query(query): Query<ActivityQuery>) -> ApiResult<Json<IdentityDto>> {
    let identity = RepositoryIdentity::resolve(query.owner(), query.raw_repo())
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    Ok(Json(identity.into()))
}

async fn metrics() -> impl IntoResponse {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return ApiError::Internal(err.to_string()).into_response();
    }
    let content_type = encoder.format_type().to_string();
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, content_type)],
        buffer,
    )
        .into_response()
}
