//! CSV export encoder
//!
//! Serializes a result set to the fixed seven-column CSV layout consumers of
//! the export depend on: Organization, Timestamp, Entity Type, Entity Name,
//! Action, User, Changes.
//!
//! Known limitation: cell values are written as-is, without quoting or
//! delimiter escaping. A field value containing a comma (or the `"; "` change
//! separator) will corrupt its row. This reproduces the reference export
//! behavior; changing it is a product decision, not a bug fix.

use chrono::{DateTime, Utc};

use crate::models::{AuditEvent, Change};

/// Fixed header row. Column order is the export's compatibility surface.
pub const CSV_HEADER: &str = "Organization,Timestamp,Entity Type,Entity Name,Action,User,Changes";

/// Separator between change entries within the Changes cell.
const CHANGE_SEPARATOR: &str = "; ";

/// Encode a result set as a complete CSV blob.
///
/// The header row is always present; an empty result set encodes to exactly
/// the header with no data rows and no trailing newline.
pub fn encode_csv<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a AuditEvent>,
{
    let mut rows = vec![CSV_HEADER.to_string()];

    for event in events {
        let columns = [
            event.organization_name.as_deref().unwrap_or("").to_string(),
            format_timestamp(event),
            event.entity_type.as_str().to_string(),
            event.entity_name.clone(),
            event.action_type.as_str().to_string(),
            event.user_name.clone(),
            format_changes(&event.changes),
        ];
        rows.push(columns.join(","));
    }

    rows.join("\n")
}

/// Download filename for an export taken at `now`:
/// `audit-log-<ISO8601-timestamp>.csv`.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("audit-log-{}.csv", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
}

/// Render the timestamp column.
///
/// Parsed instants use the fixed `YYYY-MM-DD HH:MM:SS UTC` form so the export
/// is deterministic across locales. A stored timestamp that does not parse is
/// emitted verbatim rather than dropped.
fn format_timestamp(event: &AuditEvent) -> String {
    match event.parsed_timestamp() {
        Some(instant) => instant.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => event.timestamp.clone(),
    }
}

/// Render the Changes cell: `field: old → new` entries joined with `"; "`,
/// or an empty cell when the event carries no diff.
fn format_changes(changes: &[Change]) -> String {
    changes
        .iter()
        .map(|change| {
            format!(
                "{}: {} → {}",
                change.field,
                format_value(&change.old_value),
                format_value(&change.new_value)
            )
        })
        .collect::<Vec<_>>()
        .join(CHANGE_SEPARATOR)
}

/// Render a change value as display text: strings unquoted, JSON null as
/// `null`, everything else in its JSON form.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
