use std::fmt;

use common::config::ShapeConfig;
use serde_json::Value;

use crate::models::ActivityKind;

const NO_ITEMS: &[Value] = &[];

/// A sequence of object keys leading from the payload root to an item array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath(Vec<String>);

impl CandidatePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Vec<Value>> {
        let mut current = root;
        for segment in &self.0 {
            current = current.as_object()?.get(segment)?;
        }
        current.as_array()
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Ordered places to look for the item array of one activity kind.
///
/// Every preferred key is tried at the top level first, then every key again
/// under the envelope key. The first path that resolves to an array wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeCandidates {
    paths: Vec<CandidatePath>,
}

impl ShapeCandidates {
    pub fn new<S: AsRef<str>>(keys: &[S], envelope: &str) -> Self {
        let top_level = keys.iter().map(|key| CandidatePath::new([key.as_ref()]));
        let enveloped = keys
            .iter()
            .map(|key| CandidatePath::new([envelope, key.as_ref()]));
        Self {
            paths: top_level.chain(enveloped).collect(),
        }
    }

    pub fn from_paths(paths: Vec<CandidatePath>) -> Self {
        Self { paths }
    }

    pub fn for_kind(kind: ActivityKind) -> Self {
        Self::from_config(kind, &ShapeConfig::default())
    }

    pub fn from_config(kind: ActivityKind, config: &ShapeConfig) -> Self {
        let keys = match kind {
            ActivityKind::PullRequest => &config.pull_requests,
            ActivityKind::Issue => &config.issues,
            ActivityKind::Commit => &config.commits,
        };
        Self::new(keys.as_slice(), &config.envelope)
    }

    pub fn paths(&self) -> &[CandidatePath] {
        &self.paths
    }
}

/// Where the item array of a payload was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMatch<'a> {
    TopLevelArray,
    Path(&'a CandidatePath),
    Unrecognized,
}

impl ShapeMatch<'_> {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ShapeMatch::Unrecognized)
    }
}

pub fn locate<'a, 'c>(
    raw: &'a Value,
    candidates: &'c ShapeCandidates,
) -> (&'a [Value], ShapeMatch<'c>) {
    match raw {
        Value::Array(items) => (items.as_slice(), ShapeMatch::TopLevelArray),
        Value::Object(_) => candidates
            .paths
            .iter()
            .find_map(|path| {
                path.lookup(raw)
                    .map(|items| (items.as_slice(), ShapeMatch::Path(path)))
            })
            .unwrap_or((NO_ITEMS, ShapeMatch::Unrecognized)),
        _ => (NO_ITEMS, ShapeMatch::Unrecognized),
    }
}

/// The item array of `raw`, or an empty slice when none of the candidates match.
pub fn extract_items<'a>(raw: &'a Value, candidates: &ShapeCandidates) -> &'a [Value] {
    locate(raw, candidates).0
}

/// True for payloads that carry nothing at all: `null`, `false`, `0`, `""` or `{}`.
/// An empty array is a valid, empty result and does not count.
pub fn is_empty_payload(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pr_candidates() -> ShapeCandidates {
        ShapeCandidates::for_kind(ActivityKind::PullRequest)
    }

    #[test]
    fn arrays_pass_through() {
        let raw = json!([{"id": 1}, {"id": 2}]);
        let items = extract_items(&raw, &pr_candidates());
        assert_eq!(items, raw.as_array().unwrap().as_slice());
        assert!(extract_items(&json!([]), &pr_candidates()).is_empty());
    }

    #[test]
    fn preferred_key_order_is_respected() {
        let raw = json!({"prs": [{"id": "b"}], "pullRequests": [{"id": "a"}]});
        let items = extract_items(&raw, &pr_candidates());
        assert_eq!(items, &[json!({"id": "a"})]);
    }

    #[test]
    fn enveloped_arrays_are_found() {
        let raw = json!({"data": {"items": [{"id": 7}]}});
        let candidates = ShapeCandidates::new(&["items"], "data");
        let (items, matched) = locate(&raw, &candidates);
        assert_eq!(items, &[json!({"id": 7})]);
        assert!(matches!(matched, ShapeMatch::Path(path) if path.to_string() == "data.items"));
    }

    #[test]
    fn top_level_keys_beat_envelope() {
        let raw = json!({"items": [1], "data": {"issues": [2]}});
        let candidates = ShapeCandidates::for_kind(ActivityKind::Issue);
        assert_eq!(extract_items(&raw, &candidates), &[json!(1)]);
    }

    #[test]
    fn non_array_values_under_keys_are_skipped() {
        let raw = json!({"commits": {"total": 3}, "items": [{"sha": "abc"}]});
        let candidates = ShapeCandidates::for_kind(ActivityKind::Commit);
        assert_eq!(extract_items(&raw, &candidates), &[json!({"sha": "abc"})]);
    }

    #[test]
    fn unrecognized_shapes_degrade_to_empty() {
        let candidates = pr_candidates();
        for raw in [json!({}), json!(null), json!("text"), json!(42), json!({"other": []})] {
            let (items, matched) = locate(&raw, &candidates);
            assert!(items.is_empty());
            assert!(!matched.is_recognized(), "{raw} should not match");
        }
    }

    #[test]
    fn empty_payload_detection() {
        assert!(is_empty_payload(&json!({})));
        assert!(is_empty_payload(&json!(null)));
        assert!(is_empty_payload(&json!(false)));
        assert!(is_empty_payload(&json!(0)));
        assert!(is_empty_payload(&json!("")));
        assert!(!is_empty_payload(&json!([])));
        assert!(!is_empty_payload(&json!({"prs": []})));
    }
}
