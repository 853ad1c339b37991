use common::config::FailurePolicy;
use normalizer::RepositoryIdentity;
use serde::{Deserialize, Serialize};

/// Query string of the activity endpoints; mirrors the dashboard's navigation state.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// Repository owner login.
    pub github: Option<String>,
    /// Repository name or GitHub URL.
    pub repo: Option<String>,
    #[serde(default)]
    pub raw: bool,
    pub policy: Option<FailurePolicy>,
}

impl ActivityQuery {
    pub fn owner(&self) -> &str {
        self.github.as_deref().unwrap_or_default()
    }

    pub fn raw_repo(&self) -> &str {
        self.repo.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct IdentityDto {
    pub owner: String,
    pub repo: String,
    pub full_name: String,
    pub html_url: String,
}

impl From<RepositoryIdentity> for IdentityDto {
    fn from(identity: RepositoryIdentity) -> Self {
        Self {
            owner: identity.owner().to_string(),
            repo: identity.repo().to_string(),
            full_name: identity.full_name(),
            html_url: identity.html_url(),
        }
    }
}
