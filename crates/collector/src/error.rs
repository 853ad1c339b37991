use std::time::Duration;

use http::StatusCode;
use normalizer::{ActivityKind, IdentityError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("{} {}: {body}", .kind.label(), .status.as_u16())]
    Status {
        kind: ActivityKind,
        status: StatusCode,
        body: String,
    },
    #[error("{} returned an empty response", .kind.label())]
    EmptyPayload { kind: ActivityKind },
    #[error("{} returned invalid JSON: {source}", .kind.label())]
    Decode {
        kind: ActivityKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} request failed: {source}", .kind.label())]
    Transport {
        kind: ActivityKind,
        #[source]
        source: anyhow::Error,
    },
    #[error("{} request timed out after {}s", .kind.label(), .timeout.as_secs_f64())]
    Timeout {
        kind: ActivityKind,
        timeout: Duration,
    },
}

impl FetchError {
    pub fn transport(kind: ActivityKind, err: impl Into<anyhow::Error>) -> Self {
        Self::Transport {
            kind,
            source: err.into(),
        }
    }

    /// The activity kind whose request failed; `None` for identity errors.
    pub fn kind(&self) -> Option<ActivityKind> {
        match self {
            FetchError::Identity(_) => None,
            FetchError::Status { kind, .. }
            | FetchError::EmptyPayload { kind }
            | FetchError::Decode { kind, .. }
            | FetchError::Transport { kind, .. }
            | FetchError::Timeout { kind, .. } => Some(*kind),
        }
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short outcome tag used as a metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            FetchError::Identity(_) => "identity",
            FetchError::Status { .. } => "status",
            FetchError::EmptyPayload { .. } => "empty",
            FetchError::Decode { .. } => "decode",
            FetchError::Transport { .. } => "transport",
            FetchError::Timeout { .. } => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_carries_label_status_and_body() {
        let err = FetchError::Status {
            kind: ActivityKind::Issue,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "Internal error".into(),
        };
        assert_eq!(err.to_string(), "Issues 500: Internal error");
        assert_eq!(err.kind(), Some(ActivityKind::Issue));
    }

    #[test]
    fn identity_message_is_user_facing() {
        let err = FetchError::from(IdentityError::Incomplete);
        assert_eq!(
            err.to_string(),
            "Missing GitHub information (owner or repository)."
        );
        assert_eq!(err.kind(), None);
    }
}
