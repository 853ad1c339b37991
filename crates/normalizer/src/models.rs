use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PullRequest,
    Issue,
    Commit,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 3] = [
        ActivityKind::PullRequest,
        ActivityKind::Issue,
        ActivityKind::Commit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::PullRequest => "pull_request",
            ActivityKind::Issue => "issue",
            ActivityKind::Commit => "commit",
        }
    }

    /// Short label used when a request for this kind fails.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::PullRequest => "PRs",
            ActivityKind::Issue => "Issues",
            ActivityKind::Commit => "Commits",
        }
    }

    /// Plural name used to build fallback titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityKind::PullRequest => "pull requests",
            ActivityKind::Issue => "issues",
            ActivityKind::Commit => "commits",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a record within one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum ActivityId {
    Remote(String),
    Position(usize),
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityId::Remote(id) => f.write_str(id),
            ActivityId::Position(idx) => write!(f, "#{idx}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub state: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub author_login: Option<String>,
    pub external_url: Option<String>,
}
