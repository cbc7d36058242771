//! Audit log query engine
//!
//! A pure, deterministic filter over the event collection. All active
//! constraints are combined with logical AND; the search constraint matches
//! case-insensitively against the entity name or the acting user's name.
//! Output preserves the relative order of the input, and the input is never
//! mutated.

use crate::models::{AuditEvent, FilterSpec};

/// Filter `events` down to those satisfying every active constraint in `spec`.
///
/// Returns a stable subsequence of the input: repeated calls with identical
/// inputs yield identical output. A spec with no active constraints returns
/// every event. A nonsensical date range (start after end) is executed
/// literally and simply matches nothing.
pub fn filter<'a>(events: &'a [AuditEvent], spec: &FilterSpec) -> Vec<&'a AuditEvent> {
    events.iter().filter(|event| matches(event, spec)).collect()
}

/// Whether a single event satisfies every active constraint.
fn matches(event: &AuditEvent, spec: &FilterSpec) -> bool {
    if let Some(org_id) = active(&spec.organization_id) {
        // Exact, case-sensitive comparison; events without an organization
        // never match an organization constraint.
        if event.organization_id.as_deref() != Some(org_id) {
            return false;
        }
    }

    if let Some(entity_type) = spec.entity_type {
        if event.entity_type != entity_type {
            return false;
        }
    }

    if let Some(action_type) = spec.action_type {
        if event.action_type != action_type {
            return false;
        }
    }

    if let Some(query) = active(&spec.search_query) {
        let needle = query.to_lowercase();
        let matches_entity = event.entity_name.to_lowercase().contains(&needle);
        let matches_user = event.user_name.to_lowercase().contains(&needle);
        if !matches_entity && !matches_user {
            return false;
        }
    }

    if spec.date_start.is_some() || spec.date_end.is_some() {
        // An event whose stored timestamp does not parse cannot be placed on
        // the timeline; it is excluded whenever a date bound is active.
        let Some(timestamp) = event.parsed_timestamp() else {
            return false;
        };
        if let Some(start) = spec.date_start {
            if timestamp < start {
                return false;
            }
        }
        if let Some(end) = spec.date_end {
            if timestamp > end {
                return false;
            }
        }
    }

    true
}

/// Treat empty-string constraints as unset.
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
