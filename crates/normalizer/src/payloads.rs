//! Lenient views over activity items returned by the backend.
//!
//! The backend forwards GitHub objects without a fixed contract, so every field
//! is optional and a field of the wrong JSON type reads as absent instead of
//! failing the whole item.

use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityPayload {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub sha: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub title: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub body: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub description: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub state: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub commit: Option<CommitDetail>,
}

impl ActivityPayload {
    /// Decodes one item; items that are not objects yield an empty payload.
    pub fn from_value(item: &Value) -> Self {
        match serde_json::from_value(item.clone()) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(error = %err, "activity item is not an object");
                Self::default()
            }
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRef {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub login: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub message: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub date: Option<String>,
}
