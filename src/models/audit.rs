//! Audit log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of the entity an audit event acted upon.
///
/// This enumeration is closed: deserializing any other value fails, so events
/// with an unknown entity type are rejected at the ingestion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Organization,
    SubOrganization,
    Site,
    Lab,
    Gateway,
    Instrument,
    User,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Organization => "organization",
            EntityType::SubOrganization => "sub-organization",
            EntityType::Site => "site",
            EntityType::Lab => "lab",
            EntityType::Gateway => "gateway",
            EntityType::Instrument => "instrument",
            EntityType::User => "user",
        }
    }
}

/// Category of the action an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    Assign,
    Unassign,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
            ActionType::Assign => "assign",
            ActionType::Unassign => "unassign",
        }
    }
}

/// A single field-level before/after delta attached to an audit event.
///
/// Values are arbitrary JSON scalars; a missing side is represented as JSON
/// null, matching how create/delete deltas are recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub field: String,
    #[serde(default)]
    pub old_value: serde_json::Value,
    #[serde(default)]
    pub new_value: serde_json::Value,
}

/// An immutable record of one action taken on one entity by one user at one
/// instant.
///
/// Events are created once at ingestion and never mutated afterwards. The
/// timestamp is kept in its stored ISO-8601 form; [`AuditEvent::parsed_timestamp`]
/// gives the parsed instant where one is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Opaque unique identifier.
    pub id: String,

    /// ISO-8601 (RFC 3339) timestamp of the action.
    pub timestamp: String,

    /// Owning organization; id and name are set together or not at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,

    pub entity_type: EntityType,
    pub entity_id: String,
    pub entity_name: String,

    pub action_type: ActionType,

    pub user_id: String,
    pub user_name: String,

    /// Ordered field-level deltas; empty when the action carries no diff
    /// (e.g. some assign/unassign actions).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,

    /// Action-specific context not captured by `changes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Structural validation failures raised at the ingestion boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditEventError {
    #[error("event id must not be empty")]
    EmptyId,

    #[error("timestamp '{0}' is not a valid ISO-8601 instant")]
    InvalidTimestamp(String),

    #[error("organization id and name must be non-empty together or absent together")]
    OrganizationPairing,
}

impl AuditEvent {
    /// Parse the stored timestamp, if it is a valid ISO-8601 instant.
    ///
    /// Admitted events always parse; callers that cannot rely on prior
    /// validation (the filter engine's date predicates) treat `None` as
    /// non-matching rather than failing.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Validate the structural invariants that serde cannot express.
    ///
    /// Enumeration membership is already enforced by deserialization; this
    /// checks the non-empty id, the parseable timestamp, and the organization
    /// id/name pairing invariant.
    pub fn validate(&self) -> Result<(), AuditEventError> {
        if self.id.is_empty() {
            return Err(AuditEventError::EmptyId);
        }
        if self.parsed_timestamp().is_none() {
            return Err(AuditEventError::InvalidTimestamp(self.timestamp.clone()));
        }
        match (&self.organization_id, &self.organization_name) {
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => Ok(()),
            (None, None) => Ok(()),
            _ => Err(AuditEventError::OrganizationPairing),
        }
    }
}

/// The set of active query constraints at a point in time.
///
/// Absent fields mean "no constraint on this dimension". The spec is an
/// immutable value handed to the filter engine; it is rebuilt on every
/// request rather than mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub organization_id: Option<String>,
    pub entity_type: Option<EntityType>,
    pub action_type: Option<ActionType>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    pub search_query: Option<String>,
}
