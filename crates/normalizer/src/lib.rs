pub mod identity;
pub mod models;
pub mod payloads;
pub mod shape;
pub mod transform;

pub use identity::{resolve_repo_name, IdentityError, RepositoryIdentity};
pub use models::{ActivityId, ActivityKind, ActivityRecord};
pub use payloads::ActivityPayload;
pub use shape::{
    extract_items, is_empty_payload, locate, CandidatePath, ShapeCandidates, ShapeMatch,
};
pub use transform::{normalize_activity, normalize_items, parse_timestamp};
