use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::errors::Result;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub shapes: ShapeConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

/// Where the three activity endpoints live and how requests to them are made.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "BackendConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "BackendConfig::default_pull_requests_path")]
    pub pull_requests_path: String,
    #[serde(default = "BackendConfig::default_issues_path")]
    pub issues_path: String,
    #[serde(default = "BackendConfig::default_commits_path")]
    pub commits_path: String,
    #[serde(default = "BackendConfig::default_user_agent")]
    pub user_agent: String,
    /// Bearer token attached to every request when set.
    #[serde(default)]
    pub token: Option<String>,
    /// Unset means requests may hang indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "BackendConfig::default_error_body_limit")]
    pub error_body_limit: usize,
}

impl BackendConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:5600/".to_string()
    }

    fn default_pull_requests_path() -> String {
        "github/fetchPullRequest".to_string()
    }

    fn default_issues_path() -> String {
        "github/fetchIssuesList".to_string()
    }

    fn default_commits_path() -> String {
        "github/fetchCommitHistory".to_string()
    }

    fn default_user_agent() -> String {
        "project-dashboard".to_string()
    }

    const fn default_error_body_limit() -> usize {
        1024
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            pull_requests_path: Self::default_pull_requests_path(),
            issues_path: Self::default_issues_path(),
            commits_path: Self::default_commits_path(),
            user_agent: Self::default_user_agent(),
            token: None,
            timeout_secs: None,
            error_body_limit: Self::default_error_body_limit(),
        }
    }
}

/// Ordered candidate keys probed when looking for the item array in a response.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeConfig {
    #[serde(default = "ShapeConfig::default_envelope")]
    pub envelope: String,
    #[serde(default = "ShapeConfig::default_pull_requests")]
    pub pull_requests: Vec<String>,
    #[serde(default = "ShapeConfig::default_issues")]
    pub issues: Vec<String>,
    #[serde(default = "ShapeConfig::default_commits")]
    pub commits: Vec<String>,
}

impl ShapeConfig {
    fn default_envelope() -> String {
        "data".to_string()
    }

    fn default_pull_requests() -> Vec<String> {
        to_strings(&["pullRequests", "prs", "data", "items"])
    }

    fn default_issues() -> Vec<String> {
        to_strings(&["issues", "data", "items"])
    }

    fn default_commits() -> Vec<String> {
        to_strings(&["commits", "data", "items"])
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            envelope: Self::default_envelope(),
            pull_requests: Self::default_pull_requests(),
            issues: Self::default_issues(),
            commits: Self::default_commits(),
        }
    }
}

fn to_strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// One failed request fails the whole batch.
    #[default]
    FailFast,
    /// Every kind reports its own outcome.
    Independent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub policy: FailurePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_bind")]
    pub bind: String,
}

impl ApiConfig {
    fn default_bind() -> String {
        "127.0.0.1:8080".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "ObservabilityConfig::default_metrics_path")]
    pub metrics_path: String,
}

impl ObservabilityConfig {
    fn default_metrics_path() -> String {
        "/metrics".to_string()
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_path: Self::default_metrics_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let config = AppConfig::load_from_path("/nonexistent-dashboard-config").unwrap();
        assert_eq!(config.backend.issues_path, "github/fetchIssuesList");
        assert_eq!(config.shapes.pull_requests[1], "prs");
        assert_eq!(config.fetch.policy, FailurePolicy::FailFast);
        assert!(config.backend.timeout_secs.is_none());
    }

    #[test]
    fn policy_parses_snake_case() {
        let policy: FailurePolicy =
            serde::Deserialize::deserialize(serde::de::value::StrDeserializer::<
                serde::de::value::Error,
            >::new("independent"))
            .unwrap();
        assert_eq!(policy, FailurePolicy::Independent);
    }
}
