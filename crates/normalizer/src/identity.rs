use serde::Serialize;
use thiserror::Error;
use url::Url;

const GITHUB_HOST_MARKER: &str = "github.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Missing GitHub information (owner or repository).")]
    Incomplete,
}

/// Canonical (owner, repo) pair; both parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryIdentity {
    owner: String,
    repo: String,
}

impl RepositoryIdentity {
    pub fn new(owner: &str, repo: &str) -> Result<Self, IdentityError> {
        let owner = owner.trim();
        let repo = repo.trim();
        if owner.is_empty() || repo.is_empty() {
            return Err(IdentityError::Incomplete);
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Builds an identity from an owner and a raw repo value that may be a URL.
    pub fn resolve(owner: &str, raw_repo: &str) -> Result<Self, IdentityError> {
        Self::new(owner, &resolve_repo_name(raw_repo))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn html_url(&self) -> String {
        format!("https://{GITHUB_HOST_MARKER}/{}/{}", self.owner, self.repo)
    }
}

/// Reduces a raw repository value to a bare repository name.
///
/// GitHub URLs (with or without scheme) yield their second path segment, or an
/// empty string when the path is shorter. Anything else, including URLs that fail
/// to parse, comes back trimmed but otherwise untouched.
pub fn resolve_repo_name(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    if !value.contains(GITHUB_HOST_MARKER) {
        return value.to_string();
    }

    let candidate = if value.starts_with("http") {
        value.to_string()
    } else {
        format!("https://{value}")
    };

    match Url::parse(&candidate) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).nth(1))
            .unwrap_or_default()
            .to_string(),
        Err(err) => {
            tracing::debug!(input = %value, error = %err, "repo value is not a parseable url");
            value.to_string()
        }
    }
}
