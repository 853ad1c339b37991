use chrono::{DateTime, Utc};
use normalizer::{ActivityKind, ActivityRecord};
use serde::Serialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::fetcher::{ActivityBatch, KindActivity, SettledBatch};

/// Serializable view of a fetched batch handed to presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub owner: String,
    pub repo: String,
    pub html_url: String,
    pub fetched_at: DateTime<Utc>,
    pub pull_requests: KindReport,
    pub issues: KindReport,
    pub commits: KindReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: ActivityKind,
    pub count: usize,
    pub recognized: bool,
    pub records: Vec<ActivityRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KindReport {
    fn loaded(activity: KindActivity, include_raw: bool) -> Self {
        Self {
            kind: activity.kind,
            count: activity.records.len(),
            recognized: activity.recognized,
            records: activity.records,
            raw: include_raw.then_some(activity.raw),
            error: None,
        }
    }

    fn failed(kind: ActivityKind, err: &FetchError) -> Self {
        Self {
            kind,
            count: 0,
            recognized: false,
            records: Vec::new(),
            raw: None,
            error: Some(err.to_string()),
        }
    }

    fn settled(
        kind: ActivityKind,
        outcome: Result<KindActivity, FetchError>,
        include_raw: bool,
    ) -> Self {
        match outcome {
            Ok(activity) => Self::loaded(activity, include_raw),
            Err(err) => Self::failed(kind, &err),
        }
    }
}

impl BatchReport {
    pub fn from_batch(batch: ActivityBatch, include_raw: bool) -> Self {
        Self {
            owner: batch.identity.owner().to_string(),
            repo: batch.identity.repo().to_string(),
            html_url: batch.identity.html_url(),
            fetched_at: batch.fetched_at,
            pull_requests: KindReport::loaded(batch.pull_requests, include_raw),
            issues: KindReport::loaded(batch.issues, include_raw),
            commits: KindReport::loaded(batch.commits, include_raw),
        }
    }

    pub fn from_settled(settled: SettledBatch, include_raw: bool) -> Self {
        let identity = settled.identity;
        Self {
            owner: identity.owner().to_string(),
            repo: identity.repo().to_string(),
            html_url: identity.html_url(),
            fetched_at: settled.fetched_at,
            pull_requests: KindReport::settled(
                ActivityKind::PullRequest,
                settled.pull_requests,
                include_raw,
            ),
            issues: KindReport::settled(ActivityKind::Issue, settled.issues, include_raw),
            commits: KindReport::settled(ActivityKind::Commit, settled.commits, include_raw),
        }
    }

    pub fn kinds(&self) -> [&KindReport; 3] {
        [&self.pull_requests, &self.issues, &self.commits]
    }

    pub fn failed_kinds(&self) -> usize {
        self.kinds()
            .iter()
            .filter(|kind| kind.error.is_some())
            .count()
    }
}
