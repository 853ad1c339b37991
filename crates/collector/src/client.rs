use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::config::BackendConfig;
use common::text::truncate_chars;
use common::AppError;
use http::{header, Request, Response};
use normalizer::{is_empty_payload, ActivityKind, RepositoryIdentity};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::credentials::{Anonymous, CredentialProvider, StaticToken};
use crate::error::FetchError;
use crate::transport::{HttpExec, ReqwestExecutor};

/// Produces the raw JSON payload for one activity kind of a repository.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch_raw(
        &self,
        kind: ActivityKind,
        identity: &RepositoryIdentity,
    ) -> Result<Value, FetchError>;
}

#[derive(Debug, Serialize)]
struct ActivityRequest<'a> {
    owner: &'a str,
    #[serde(rename = "repoLink")]
    repo_link: &'a str,
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pull_requests: Url,
    issues: Url,
    commits: Url,
}

impl Endpoints {
    pub fn from_config(config: &BackendConfig) -> common::Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|err| AppError::endpoint(format!("{}: {err}", config.base_url)))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|err| AppError::endpoint(format!("{path}: {err}")))
        };
        Ok(Self {
            pull_requests: join(&config.pull_requests_path)?,
            issues: join(&config.issues_path)?,
            commits: join(&config.commits_path)?,
        })
    }

    pub fn url(&self, kind: ActivityKind) -> &Url {
        match kind {
            ActivityKind::PullRequest => &self.pull_requests,
            ActivityKind::Issue => &self.issues,
            ActivityKind::Commit => &self.commits,
        }
    }
}

/// Posts `{owner, repoLink}` to the backend endpoint of each activity kind.
pub struct HttpActivityClient {
    exec: Arc<dyn HttpExec>,
    endpoints: Endpoints,
    credentials: Arc<dyn CredentialProvider>,
    timeout: Option<Duration>,
    error_body_limit: usize,
}

impl HttpActivityClient {
    pub fn new(exec: Arc<dyn HttpExec>, endpoints: Endpoints) -> Self {
        Self {
            exec,
            endpoints,
            credentials: Arc::new(Anonymous),
            timeout: None,
            error_body_limit: 1024,
        }
    }

    /// Builds a reqwest-backed client from configuration.
    pub fn from_config(config: &BackendConfig) -> common::Result<Self> {
        let timeout = config.timeout_secs.map(Duration::from_secs);
        let exec = Arc::new(ReqwestExecutor::new(&config.user_agent, timeout)?);
        let mut client = Self::new(exec, Endpoints::from_config(config)?)
            .error_body_limit(config.error_body_limit);
        if let Some(timeout) = timeout {
            client = client.timeout(timeout);
        }
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            client = client.credentials(Arc::new(StaticToken::new(token)));
        }
        Ok(client)
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn error_body_limit(mut self, limit: usize) -> Self {
        self.error_body_limit = limit;
        self
    }

    fn build_request(
        &self,
        kind: ActivityKind,
        identity: &RepositoryIdentity,
    ) -> Result<Request<Vec<u8>>, FetchError> {
        let body = serde_json::to_vec(&ActivityRequest {
            owner: identity.owner(),
            repo_link: identity.repo(),
        })
        .map_err(|err| FetchError::transport(kind, err))?;

        let mut builder = Request::builder()
            .method("POST")
            .uri(self.endpoints.url(kind).as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(token) = self.credentials.bearer_token() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(body)
            .map_err(|err| FetchError::transport(kind, err))
    }

    async fn execute(
        &self,
        kind: ActivityKind,
        request: Request<Vec<u8>>,
    ) -> Result<Response<Vec<u8>>, FetchError> {
        let call = self.exec.execute(request);
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| FetchError::Timeout { kind, timeout })?,
            None => call.await,
        };
        result.map_err(|err| FetchError::transport(kind, err))
    }
}

#[async_trait]
impl ActivitySource for HttpActivityClient {
    #[instrument(skip(self, identity), fields(repo = %identity.full_name()))]
    async fn fetch_raw(
        &self,
        kind: ActivityKind,
        identity: &RepositoryIdentity,
    ) -> Result<Value, FetchError> {
        let request = self.build_request(kind, identity)?;
        debug!(url = %request.uri(), "dispatching activity request");
        let response = self.execute(kind, request).await?;

        let status = response.status();
        let body = response.into_body();
        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(FetchError::Status {
                kind,
                status,
                body: truncate_chars(&text, self.error_body_limit),
            });
        }

        let value: Value =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode { kind, source })?;
        if is_empty_payload(&value) {
            return Err(FetchError::EmptyPayload { kind });
        }
        Ok(value)
    }
}
