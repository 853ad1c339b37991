pub mod client;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod report;
pub mod transport;

pub use client::{ActivitySource, Endpoints, HttpActivityClient};
pub use credentials::{Anonymous, CredentialProvider, StaticToken};
pub use error::FetchError;
pub use fetcher::{ActivityBatch, ActivityFetcher, KindActivity, SettledBatch};
pub use report::{BatchReport, KindReport};
pub use transport::{HttpExec, ReqwestExecutor};
