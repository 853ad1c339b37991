use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use common::config::ShapeConfig;
use futures::future::{join3, try_join3};
use normalizer::{
    locate, normalize_items, ActivityKind, ActivityRecord, RepositoryIdentity, ShapeCandidates,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::client::ActivitySource;
use crate::error::FetchError;
use crate::metrics;

/// Normalized records of one kind together with the payload they came from.
#[derive(Debug, Clone, Serialize)]
pub struct KindActivity {
    pub kind: ActivityKind,
    pub records: Vec<ActivityRecord>,
    pub raw: Value,
    /// False when no candidate key matched and the records are empty by default.
    pub recognized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityBatch {
    pub identity: RepositoryIdentity,
    pub fetched_at: DateTime<Utc>,
    pub pull_requests: KindActivity,
    pub issues: KindActivity,
    pub commits: KindActivity,
}

impl ActivityBatch {
    pub fn get(&self, kind: ActivityKind) -> &KindActivity {
        match kind {
            ActivityKind::PullRequest => &self.pull_requests,
            ActivityKind::Issue => &self.issues,
            ActivityKind::Commit => &self.commits,
        }
    }

    pub fn records(&self, kind: ActivityKind) -> &[ActivityRecord] {
        &self.get(kind).records
    }

    pub fn raw(&self, kind: ActivityKind) -> &Value {
        &self.get(kind).raw
    }
}

/// Batch where every kind succeeded or failed on its own.
#[derive(Debug)]
pub struct SettledBatch {
    pub identity: RepositoryIdentity,
    pub fetched_at: DateTime<Utc>,
    pub pull_requests: Result<KindActivity, FetchError>,
    pub issues: Result<KindActivity, FetchError>,
    pub commits: Result<KindActivity, FetchError>,
}

impl SettledBatch {
    pub fn get(&self, kind: ActivityKind) -> &Result<KindActivity, FetchError> {
        match kind {
            ActivityKind::PullRequest => &self.pull_requests,
            ActivityKind::Issue => &self.issues,
            ActivityKind::Commit => &self.commits,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchError> {
        ActivityKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).as_ref().err())
    }
}

/// Fires the pull request, issue and commit requests for a repository together.
pub struct ActivityFetcher {
    source: Arc<dyn ActivitySource>,
    pull_requests: ShapeCandidates,
    issues: ShapeCandidates,
    commits: ShapeCandidates,
}

impl ActivityFetcher {
    pub fn new(source: Arc<dyn ActivitySource>) -> Self {
        Self::with_shapes(source, &ShapeConfig::default())
    }

    pub fn with_shapes(source: Arc<dyn ActivitySource>, shapes: &ShapeConfig) -> Self {
        Self {
            source,
            pull_requests: ShapeCandidates::from_config(ActivityKind::PullRequest, shapes),
            issues: ShapeCandidates::from_config(ActivityKind::Issue, shapes),
            commits: ShapeCandidates::from_config(ActivityKind::Commit, shapes),
        }
    }

    pub fn candidates(&self, kind: ActivityKind) -> &ShapeCandidates {
        match kind {
            ActivityKind::PullRequest => &self.pull_requests,
            ActivityKind::Issue => &self.issues,
            ActivityKind::Commit => &self.commits,
        }
    }

    /// Resolves the identity and fetches the batch; nothing is sent when it is incomplete.
    pub async fn fetch_for(
        &self,
        owner: &str,
        raw_repo: &str,
    ) -> Result<ActivityBatch, FetchError> {
        let identity = RepositoryIdentity::resolve(owner, raw_repo)?;
        self.fetch_batch(&identity).await
    }

    pub async fn fetch_settled_for(
        &self,
        owner: &str,
        raw_repo: &str,
    ) -> Result<SettledBatch, FetchError> {
        let identity = RepositoryIdentity::resolve(owner, raw_repo)?;
        Ok(self.fetch_settled(&identity).await)
    }

    /// Awaits all three requests; the first failure fails the batch and discards
    /// whatever the other requests returned.
    #[instrument(skip(self, identity), fields(repo = %identity.full_name()))]
    pub async fn fetch_batch(
        &self,
        identity: &RepositoryIdentity,
    ) -> Result<ActivityBatch, FetchError> {
        let joined = try_join3(
            self.observed_fetch(ActivityKind::PullRequest, identity),
            self.observed_fetch(ActivityKind::Issue, identity),
            self.observed_fetch(ActivityKind::Commit, identity),
        )
        .await;

        let (prs, issues, commits) = match joined {
            Ok(payloads) => payloads,
            Err(err) => {
                metrics::BATCHES_TOTAL.with_label_values(&["failure"]).inc();
                warn!(error = %err, "activity batch failed");
                return Err(err);
            }
        };

        let fetched_at = Utc::now();
        let batch = ActivityBatch {
            identity: identity.clone(),
            fetched_at,
            pull_requests: self.normalize(ActivityKind::PullRequest, prs, fetched_at),
            issues: self.normalize(ActivityKind::Issue, issues, fetched_at),
            commits: self.normalize(ActivityKind::Commit, commits, fetched_at),
        };
        metrics::BATCHES_TOTAL.with_label_values(&["success"]).inc();
        info!(
            pull_requests = batch.pull_requests.records.len(),
            issues = batch.issues.records.len(),
            commits = batch.commits.records.len(),
            "activity batch loaded"
        );
        Ok(batch)
    }

    /// Awaits all three requests and keeps every kind's outcome separately.
    #[instrument(skip(self, identity), fields(repo = %identity.full_name()))]
    pub async fn fetch_settled(&self, identity: &RepositoryIdentity) -> SettledBatch {
        let (prs, issues, commits) = join3(
            self.observed_fetch(ActivityKind::PullRequest, identity),
            self.observed_fetch(ActivityKind::Issue, identity),
            self.observed_fetch(ActivityKind::Commit, identity),
        )
        .await;

        let fetched_at = Utc::now();
        let settled = SettledBatch {
            identity: identity.clone(),
            fetched_at,
            pull_requests: prs
                .map(|raw| self.normalize(ActivityKind::PullRequest, raw, fetched_at)),
            issues: issues.map(|raw| self.normalize(ActivityKind::Issue, raw, fetched_at)),
            commits: commits.map(|raw| self.normalize(ActivityKind::Commit, raw, fetched_at)),
        };
        let failed = settled.failures().count();
        let outcome = match failed {
            0 => "success",
            3 => "failure",
            _ => "partial",
        };
        metrics::BATCHES_TOTAL.with_label_values(&[outcome]).inc();
        for err in settled.failures() {
            warn!(error = %err, "activity request failed");
        }
        settled
    }

    async fn observed_fetch(
        &self,
        kind: ActivityKind,
        identity: &RepositoryIdentity,
    ) -> Result<Value, FetchError> {
        let start = Instant::now();
        let result = self.source.fetch_raw(kind, identity).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.outcome(),
        };
        metrics::FETCH_REQUESTS_TOTAL
            .with_label_values(&[kind.as_str(), outcome])
            .inc();
        metrics::FETCH_LATENCY_SECONDS
            .with_label_values(&[kind.as_str()])
            .observe(start.elapsed().as_secs_f64());
        result
    }

    fn normalize(&self, kind: ActivityKind, raw: Value, now: DateTime<Utc>) -> KindActivity {
        let (items, matched) = locate(&raw, self.candidates(kind));
        if !matched.is_recognized() {
            metrics::SHAPE_MISSES_TOTAL
                .with_label_values(&[kind.as_str()])
                .inc();
            debug!(kind = %kind, "payload shape not recognized, treating as empty");
        }
        let records = normalize_items(kind, items, now);
        metrics::FETCH_ITEMS_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc_by(records.len() as u64);
        KindActivity {
            kind,
            records,
            recognized: matched.is_recognized(),
            raw,
        }
    }
}
