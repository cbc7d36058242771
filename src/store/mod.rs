//! In-memory audit event store
//!
//! Holds the admitted event collection for the lifetime of the process.
//! Events come from a JSON seed file in this deployment; in a production
//! system they would be supplied by an external audit-event producer. Either
//! way the store is read-only once constructed: events are validated at the
//! ingestion boundary and never mutated or deleted afterwards.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::models::{AuditEvent, Organization};

/// The immutable audit event collection.
#[derive(Debug)]
pub struct EventStore {
    events: Vec<AuditEvent>,
}

impl EventStore {
    /// Build a store from an already-deserialized collection, enforcing the
    /// ingestion invariants: structural validity of each event and unique ids.
    pub fn from_events(events: Vec<AuditEvent>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(events.len());
        for (index, event) in events.iter().enumerate() {
            event
                .validate()
                .with_context(|| format!("invalid audit event at index {}", index))?;
            if !seen.insert(event.id.as_str()) {
                bail!("duplicate audit event id '{}' at index {}", event.id, index);
            }
        }
        Ok(Self { events })
    }

    /// Load and validate the event collection from a JSON seed file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read audit event seed file: {:?}", path))?;
        let events: Vec<AuditEvent> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse audit event seed file: {:?}", path))?;
        Self::from_events(events)
            .with_context(|| format!("Failed to validate audit event seed file: {:?}", path))
    }

    /// The full collection, in ingestion order.
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Look up a single event by id.
    pub fn get(&self, id: &str) -> Option<&AuditEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// The organization set for the filter dropdown, derived from the events
    /// themselves: unique id/name pairs, sorted by name.
    pub fn organizations(&self) -> Vec<Organization> {
        let mut seen = HashSet::new();
        let mut organizations: Vec<Organization> = self
            .events
            .iter()
            .filter_map(|event| {
                let id = event.organization_id.as_ref()?;
                let name = event.organization_name.as_ref()?;
                seen.insert(id.clone()).then(|| Organization {
                    id: id.clone(),
                    name: name.clone(),
                })
            })
            .collect();
        organizations.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        organizations
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
