use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use common::text::{first_line, non_blank, remaining_lines};
use serde_json::Value;

use crate::models::{ActivityId, ActivityKind, ActivityRecord};
use crate::payloads::ActivityPayload;

/// Maps every item of one payload to a record; `now` stands in for missing timestamps.
pub fn normalize_items(
    kind: ActivityKind,
    items: &[Value],
    now: DateTime<Utc>,
) -> Vec<ActivityRecord> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_activity(kind, index, item, now))
        .collect()
}

pub fn normalize_activity(
    kind: ActivityKind,
    index: usize,
    item: &Value,
    now: DateTime<Utc>,
) -> ActivityRecord {
    let payload = ActivityPayload::from_value(item);
    let commit_message = payload
        .commit
        .as_ref()
        .and_then(|commit| commit.message.as_deref())
        .and_then(non_blank);

    // a source whose first line is blank falls through to the next one
    let title = [
        payload.title.as_deref(),
        payload.name.as_deref(),
        commit_message,
    ]
    .into_iter()
    .flatten()
    .map(first_line)
    .find_map(non_blank)
    .map(str::to_string)
    .unwrap_or_else(|| format!("{} #{}", kind.display_name(), index + 1));

    let description = match kind {
        ActivityKind::Commit => commit_message.map(remaining_lines).unwrap_or_default(),
        _ => present(&payload.body)
            .or_else(|| present(&payload.description))
            .unwrap_or_default()
            .to_string(),
    };

    let state = match kind {
        ActivityKind::Commit => None,
        _ => present(&payload.state).map(str::to_string),
    };

    ActivityRecord {
        id: activity_id(&payload, index),
        kind,
        title,
        description,
        state,
        timestamp: timestamp(&payload).unwrap_or(now),
        author_login: author(&payload),
        external_url: present(&payload.html_url).map(str::to_string),
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().and_then(non_blank)
}

fn activity_id(payload: &ActivityPayload, index: usize) -> ActivityId {
    let remote = match &payload.id {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };
    remote
        .or_else(|| present(&payload.node_id).map(str::to_string))
        .or_else(|| present(&payload.sha).map(str::to_string))
        .map(ActivityId::Remote)
        .unwrap_or(ActivityId::Position(index))
}

fn timestamp(payload: &ActivityPayload) -> Option<DateTime<Utc>> {
    let commit_date = payload
        .commit
        .as_ref()
        .and_then(|commit| commit.author.as_ref())
        .and_then(|author| author.date.as_deref());

    [
        payload.created_at.as_deref(),
        payload.updated_at.as_deref(),
        payload.closed_at.as_deref(),
        commit_date,
    ]
    .into_iter()
    .flatten()
    .find_map(parse_timestamp)
}

fn author(payload: &ActivityPayload) -> Option<String> {
    payload
        .user
        .as_ref()
        .and_then(|user| present(&user.login))
        .or_else(|| {
            payload
                .commit
                .as_ref()
                .and_then(|commit| commit.author.as_ref())
                .and_then(|author| present(&author.name))
        })
        .map(str::to_string)
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a bare date.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
